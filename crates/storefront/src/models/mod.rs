//! Domain models for storefront.
//!
//! The storefront keeps no records of its own; these are the types it
//! stores in the visitor's session.

pub mod flash;
pub mod session;

pub use flash::{Flash, FlashLevel};
pub use session::CurrentUser;
pub use session::keys as session_keys;
