//! Search-as-you-type route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tower_sessions::cookie::{Cookie, SameSite};
use tracing::instrument;
use uuid::Uuid;

use super::products::{ProductCard, SearchQuery};
use crate::error::Result;
use crate::search::Debounced;
use crate::state::AppState;

/// Cookie holding the visitor's debounce key.
///
/// Kept out of the session so typing in the search box never creates a
/// server-side session record.
pub const SEARCH_COOKIE_NAME: &str = "qkart_search";

/// Product grid fragment, swapped into the page by `search.js`.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub query: String,
    pub products: Vec<ProductCard>,
}

/// Debounced search suggestions.
///
/// Every keystroke lands here. Only the request that survives the debounce
/// window queries the backend; superseded ones get `204 No Content` and the
/// script leaves the grid alone.
#[instrument(skip(state, headers))]
pub async fn suggest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let (key, new_cookie) = match search_key(&headers) {
        Some(key) => (key, None),
        None => {
            let key = Uuid::new_v4().to_string();
            let cookie = search_cookie(&key, state.config().is_secure());
            (key, Some(cookie))
        }
    };

    let mut response = if state.debouncer().debounce(&key).await == Debounced::Superseded {
        StatusCode::NO_CONTENT.into_response()
    } else {
        // Failures leave the current grid in place: the script ignores errors
        let products = state
            .api()
            .find_products(&query.q)
            .await?
            .iter()
            .map(ProductCard::from)
            .collect();

        ProductGridTemplate {
            query: query.q,
            products,
        }
        .into_response()
    };

    if let Some(cookie) = new_cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

/// The visitor's debounce key from the request cookies, if it has one.
fn search_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .find(|cookie| cookie.name() == SEARCH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
        .filter(|key| Uuid::parse_str(key).is_ok())
}

/// `Set-Cookie` value for a freshly minted debounce key.
fn search_cookie(key: &str, secure: bool) -> HeaderValue {
    let cookie = Cookie::build((SEARCH_COOKIE_NAME, key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    // A UUID and fixed attributes are always a valid header value
    HeaderValue::from_str(&cookie.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("qkart_search=; Path=/"))
}
