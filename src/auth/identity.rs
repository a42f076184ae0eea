//! Caller identity supplied by the external identity provider.
//!
//! Authentication itself happens elsewhere; this layer only sees whether a principal is
//! present and asks the backend whether that principal is an administrator.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::collaborator::Collaborator;
use crate::errors::AppError;
use crate::models::Principal;

/// Header carrying the signed-in principal.
pub const IDENTITY_HEADER: &str = "x-identity";

/// The identity behind a request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    principal: Option<Principal>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(Principal::new(principal)),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Principal::new);

        Ok(Caller { principal })
    }
}

/// The caller's principal, or an access-denied error when signed out.
pub fn require_identity(caller: &Caller) -> Result<&Principal, AppError> {
    caller.principal().ok_or(AppError::NotSignedIn)
}

/// Gate an administrator screen. A failed admin lookup counts as not admin.
pub async fn require_admin<'a>(
    collaborator: &dyn Collaborator,
    caller: &'a Caller,
) -> Result<&'a Principal, AppError> {
    let principal = require_identity(caller)?;

    match collaborator.is_caller_admin(caller).await {
        Ok(true) => Ok(principal),
        Ok(false) => Err(AppError::NotAdmin),
        Err(e) => {
            tracing::warn!("Admin check failed for {}: {}", principal, e);
            Err(AppError::NotAdmin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::InMemoryCollaborator;
    use axum::http::Request;

    async fn caller_from(header: Option<&str>) -> Caller {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(IDENTITY_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Caller::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_caller_from_header() {
        assert_eq!(caller_from(None).await, Caller::anonymous());
        assert_eq!(caller_from(Some("   ")).await, Caller::anonymous());
        assert_eq!(
            caller_from(Some(" abc-123 ")).await,
            Caller::signed_in("abc-123")
        );
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let backend = InMemoryCollaborator::with_admins(["root"]);

        assert_eq!(
            require_admin(&backend, &Caller::anonymous()).await,
            Err(AppError::NotSignedIn)
        );
        assert_eq!(
            require_admin(&backend, &Caller::signed_in("guest")).await,
            Err(AppError::NotAdmin)
        );
        let root = Caller::signed_in("root");
        assert_eq!(
            require_admin(&backend, &root).await.unwrap().as_str(),
            "root"
        );
    }
}
