//! User input validation.
//!
//! Each check returns the first failing rule as a [`ValidationError`] whose
//! `Display` text is shown to the user verbatim, so rule order matters.

use thiserror::Error;

use crate::cart::Cart;
use crate::types::{Address, AddressId, Price, Username, UsernameError};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Username(#[from] UsernameError),
    #[error("Password is a required field")]
    PasswordRequired,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Address cannot be empty")]
    AddressRequired,
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Please add a new address before proceeding.")]
    NoAddresses,
    #[error("Please select one shipping address to proceed.")]
    NoAddressSelected,
    #[error("You do not have enough balance in your wallet for this purchase")]
    InsufficientBalance,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub password: String,
}

/// Validate the registration form.
///
/// Rules, first failure wins: username present, username length, password
/// present, password length, password confirmation matches.
///
/// # Errors
///
/// Returns the first rule that fails.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<Registration, ValidationError> {
    let username = Username::parse(username)?;

    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(Registration {
        username,
        password: password.to_owned(),
    })
}

/// Validate the login form. Only presence is checked; the backend decides
/// whether the credentials are right.
///
/// # Errors
///
/// Returns the first rule that fails.
pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(UsernameError::Empty.into());
    }
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    Ok(())
}

/// Validate a new address, returning it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError::AddressRequired`] for blank input.
pub fn validate_address(address: &str) -> Result<String, ValidationError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::AddressRequired);
    }
    Ok(trimmed.to_owned())
}

/// Check that an order can be placed.
///
/// # Errors
///
/// Returns the first failing precondition: empty cart, no saved addresses,
/// no address selected (or the selection is not one of the saved ones),
/// total above the wallet balance.
pub fn validate_checkout<'a>(
    cart: &Cart,
    addresses: &'a [Address],
    selected: Option<&AddressId>,
    balance: Price,
) -> Result<&'a Address, ValidationError> {
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }
    if addresses.is_empty() {
        return Err(ValidationError::NoAddresses);
    }

    let address = selected
        .and_then(|id| addresses.iter().find(|a| &a.id == id))
        .ok_or(ValidationError::NoAddressSelected)?;

    if cart.total_value() > balance {
        return Err(ValidationError::InsufficientBalance);
    }

    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::generate_cart_items;
    use crate::types::{CartEntry, Product, ProductId};

    fn message(result: Result<Registration, ValidationError>) -> String {
        result.map_or_else(|e| e.to_string(), |_| "ok".to_string())
    }

    #[test]
    fn test_registration_rule_order() {
        assert_eq!(message(validate_registration("", "", "")), "Username is a required field");
        assert_eq!(
            message(validate_registration("abc", "", "")),
            "Username must be at least 6 characters"
        );
        assert_eq!(
            message(validate_registration("crio.do", "", "")),
            "Password is a required field"
        );
        assert_eq!(
            message(validate_registration("crio.do", "12345", "12345")),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            message(validate_registration("crio.do", "learnbydoing", "learnbydoinG")),
            "Passwords do not match"
        );
        assert_eq!(
            message(validate_registration("crio.do", "learnbydoing", "learnbydoing")),
            "ok"
        );
    }

    #[test]
    fn test_password_mismatch_with_equal_length_is_rejected() {
        assert_eq!(
            validate_registration("crio.do", "abcdef", "abcdeg").err(),
            Some(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_login_presence_only() {
        assert_eq!(
            validate_login("", "x").err().map(|e| e.to_string()),
            Some("Username is a required field".to_string())
        );
        assert_eq!(
            validate_login("crio.do", "").err(),
            Some(ValidationError::PasswordRequired)
        );
        // Short values are left for the backend to reject
        assert!(validate_login("a", "b").is_ok());
    }

    #[test]
    fn test_address_is_trimmed() {
        assert_eq!(validate_address("  "), Err(ValidationError::AddressRequired));
        assert_eq!(validate_address(" 12 Main St ").as_deref(), Ok("12 Main St"));
    }

    fn cart_worth(dollars: i64) -> Cart {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Thing".to_string(),
            category: "Misc".to_string(),
            cost: Price::from_dollars(dollars),
            rating: 3,
            image: String::new(),
        };
        generate_cart_items(&[CartEntry::new("p1", 1)], &[product])
    }

    fn address(id: &str) -> Address {
        Address {
            id: AddressId::new(id),
            address: format!("{id} Long Street, Some City 560001"),
        }
    }

    #[test]
    fn test_checkout_rule_order() {
        let balance = Price::from_dollars(5000);
        let addresses = vec![address("a1"), address("a2")];
        let a2 = AddressId::new("a2");

        assert_eq!(
            validate_checkout(&Cart::empty(), &addresses, Some(&a2), balance).err(),
            Some(ValidationError::EmptyCart)
        );
        assert_eq!(
            validate_checkout(&cart_worth(10), &[], Some(&a2), balance).err(),
            Some(ValidationError::NoAddresses)
        );
        assert_eq!(
            validate_checkout(&cart_worth(10), &addresses, None, balance).err(),
            Some(ValidationError::NoAddressSelected)
        );
        assert_eq!(
            validate_checkout(&cart_worth(10), &addresses, Some(&AddressId::new("zz")), balance)
                .err(),
            Some(ValidationError::NoAddressSelected)
        );
        assert_eq!(
            validate_checkout(&cart_worth(6000), &addresses, Some(&a2), balance).err(),
            Some(ValidationError::InsufficientBalance)
        );
        assert_eq!(
            validate_checkout(&cart_worth(5000), &addresses, Some(&a2), balance)
                .map(|a| a.id.clone()),
            Ok(a2)
        );
    }
}
