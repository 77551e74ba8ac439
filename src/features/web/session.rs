//! Web session extractors.
//!
//! `session_middleware` resolves the session cookie and stores the user in the
//! request extensions; these extractors only read it back.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Method},
    response::Redirect,
};

use crate::features::auth::model::AuthenticatedUser;

/// The signed-in user, if any
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Signed-in user; anonymous visitors are sent to the login page
pub struct RequireLogin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireLogin)
            .ok_or_else(|| login_redirect(parts))
    }
}

/// Signed-in admin; other users are sent back to the dashboard
pub struct RequireWebAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireWebAdmin
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| login_redirect(parts))?;

        if !user.is_admin {
            tracing::warn!("User {} denied access to {}", user.id, parts.uri.path());
            return Err(Redirect::to("/?notice=access_denied"));
        }

        Ok(RequireWebAdmin(user))
    }
}

/// Login URL that brings the visitor back here afterwards. Only GET requests
/// are worth returning to.
fn login_redirect(parts: &Parts) -> Redirect {
    Redirect::to(&login_url(&parts.method, parts.uri.path_and_query().map(|pq| pq.as_str())))
}

fn login_url(method: &Method, target: Option<&str>) -> String {
    match target {
        Some(target) if method == Method::GET => {
            format!(
                "/login?notice=login_required&next={}",
                urlencoding::encode(target)
            )
        }
        _ => "/login?notice=login_required".to_string(),
    }
}

/// Accept a post-login redirect target only when it is a path on this site
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|next| {
        next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;

    fn parts(method: Method, uri: &str, user: Option<AuthenticatedUser>) -> Parts {
        let (mut parts, _) = Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn user(is_admin: bool) -> AuthenticatedUser {
        AuthenticatedUser {
            id: 5,
            username: "citizen".into(),
            full_name: "A Citizen".into(),
            email: "citizen@example.com".into(),
            is_admin,
        }
    }

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_anonymous_get_redirects_with_next() {
        let mut parts = parts(Method::GET, "/report/new?x=1", None);
        let Err(redirect) = RequireLogin::from_request_parts(&mut parts, &()).await else {
            panic!("expected redirect");
        };
        assert_eq!(
            location(redirect),
            "/login?notice=login_required&next=%2Freport%2Fnew%3Fx%3D1"
        );
    }

    #[tokio::test]
    async fn test_anonymous_post_redirects_without_next() {
        let mut parts = parts(Method::POST, "/report/3/comment", None);
        let Err(redirect) = RequireLogin::from_request_parts(&mut parts, &()).await else {
            panic!("expected redirect");
        };
        assert_eq!(location(redirect), "/login?notice=login_required");
    }

    #[tokio::test]
    async fn test_non_admin_is_sent_to_dashboard() {
        let mut parts = parts(Method::GET, "/admin/reports", Some(user(false)));
        let Err(redirect) = RequireWebAdmin::from_request_parts(&mut parts, &()).await else {
            panic!("expected redirect");
        };
        assert_eq!(location(redirect), "/?notice=access_denied");
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let mut parts = parts(Method::GET, "/admin/reports", Some(user(true)));
        assert!(RequireWebAdmin::from_request_parts(&mut parts, &())
            .await
            .is_ok());
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/reports?status=pending")), Some("/reports?status=pending"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("")), None);
        assert_eq!(safe_next(None), None);
    }
}
