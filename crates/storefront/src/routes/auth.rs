//! Authentication route handlers.
//!
//! Handles login, registration and logout against the QKart backend. Forms
//! are validated locally first so obvious mistakes never reach the API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use qkart_core::{validate_login, validate_registration};

use super::layout::Layout;
use crate::api::{ApiError, BACKEND_UNAVAILABLE};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{CspNonce, OptionalAuth, set_current_user};
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    /// Username to pre-fill after a failed attempt.
    pub username: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub username: String,
}

impl LoginTemplate {
    /// The login form again, pre-filled, with `flash` in place of any
    /// pending toast.
    async fn failed(session: &Session, nonce: CspNonce, username: String, flash: Flash) -> Self {
        Self {
            layout: Layout::new(session, None, nonce).await.auth_page().with_flash(flash),
            username,
        }
    }

    fn with_status(self, status: StatusCode) -> Response {
        (status, self).into_response()
    }
}

impl RegisterTemplate {
    async fn failed(session: &Session, nonce: CspNonce, username: String, flash: Flash) -> Self {
        Self {
            layout: Layout::new(session, None, nonce).await.auth_page().with_flash(flash),
            username,
        }
    }

    fn with_status(self, status: StatusCode) -> Response {
        (status, self).into_response()
    }
}

/// Status for a form re-rendered after a backend failure.
fn failure_status(err: &ApiError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    nonce: CspNonce,
) -> LoginTemplate {
    LoginTemplate {
        layout: Layout::new(&session, user.as_ref(), nonce).await.auth_page(),
        username: String::new(),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, nonce, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if let Err(e) = validate_login(&form.username, &form.password) {
        let flash = Flash::warning(e.to_string());
        return Ok(LoginTemplate::failed(&session, nonce, form.username, flash)
            .await
            .with_status(StatusCode::BAD_REQUEST));
    }

    let login = match state.api().login(&form.username, &form.password).await {
        Ok(login) => login,
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            let flash = Flash::error(e.user_message(BACKEND_UNAVAILABLE));
            return Ok(LoginTemplate::failed(&session, nonce, form.username, flash)
                .await
                .with_status(failure_status(&e)));
        }
    };

    let user = CurrentUser::new(login.username, login.token, login.balance);

    set_current_user(&session, &user).await?;
    set_sentry_user(&user.username);
    tracing::info!(username = %user.username, "User logged in");

    Flash::success("Logged in successfully").push(&session).await;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    nonce: CspNonce,
) -> RegisterTemplate {
    RegisterTemplate {
        layout: Layout::new(&session, user.as_ref(), nonce).await.auth_page(),
        username: String::new(),
    }
}

/// Handle registration form submission.
///
/// The backend does not log the new user in, so success sends them to the
/// login page.
#[instrument(skip(state, session, nonce, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration =
        match validate_registration(&form.username, &form.password, &form.confirm_password) {
            Ok(registration) => registration,
            Err(e) => {
                let flash = Flash::warning(e.to_string());
                return RegisterTemplate::failed(&session, nonce, form.username, flash)
                    .await
                    .with_status(StatusCode::BAD_REQUEST);
            }
        };

    if let Err(e) = state
        .api()
        .register(registration.username.as_str(), &registration.password)
        .await
    {
        tracing::warn!("Registration failed: {e}");
        let flash = Flash::error(e.user_message(BACKEND_UNAVAILABLE));
        return RegisterTemplate::failed(&session, nonce, form.username, flash)
            .await
            .with_status(failure_status(&e));
    }

    tracing::info!(username = %registration.username, "User registered");
    Flash::success("Registered successfully").push(&session).await;
    Redirect::to("/login").into_response()
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout: drop the whole session.
pub async fn logout(session: Session) -> Result<Redirect> {
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
