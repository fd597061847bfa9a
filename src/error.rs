//! Error taxonomy shared by the store, service and GraphQL layers
//!
//! Every failing operation maps to exactly one [`LinkError`] variant. The
//! GraphQL layer turns the variant into `code` and `status` extensions so
//! clients can branch on them without parsing messages.

use async_graphql::ErrorExtensions;
use thiserror::Error;

pub type LinkResult<T> = Result<T, LinkError>;

#[derive(Error, Debug)]
pub enum LinkError {
    /// No caller identity on the request
    #[error("{0}")]
    Unauthenticated(String),

    /// Caller is known but does not own the resource
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate description/url or repeated vote
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinkError {
    pub fn not_authenticated() -> Self {
        Self::Unauthenticated("Not authenticated".to_string())
    }

    pub fn not_owner() -> Self {
        Self::Unauthorized("Not authorized, you are not the owner of this link".to_string())
    }

    pub fn duplicate_link() -> Self {
        Self::Conflict("Link or description already exists".to_string())
    }

    /// Machine-readable code exposed in GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            LinkError::Unauthenticated(_) => "UNAUTHENTICATED",
            LinkError::Unauthorized(_) => "FORBIDDEN",
            LinkError::NotFound(_) => "NOT_FOUND",
            LinkError::Conflict(_) => "CONFLICT",
            LinkError::BadRequest(_) => "BAD_REQUEST",
            LinkError::Internal(_) => "INTERNAL",
        }
    }

    /// HTTP-like status paired with the code
    pub fn status(&self) -> u16 {
        match self {
            LinkError::Unauthenticated(_) => 401,
            LinkError::Unauthorized(_) => 403,
            LinkError::NotFound(_) => 404,
            LinkError::Conflict(_) => 409,
            LinkError::BadRequest(_) => 400,
            LinkError::Internal(_) => 500,
        }
    }
}

impl From<sqlx::Error> for LinkError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error()
            && db_err.is_unique_violation()
        {
            return unique_violation(db_err.message());
        }
        LinkError::Internal(e.to_string())
    }
}

// SQLite names the constraint as "UNIQUE constraint failed: <table>.<column>".
fn unique_violation(message: &str) -> LinkError {
    if message.contains("links.") {
        LinkError::duplicate_link()
    } else {
        LinkError::Conflict("Record already exists".to_string())
    }
}

impl ErrorExtensions for LinkError {
    fn extend(&self) -> async_graphql::Error {
        let message = match self {
            LinkError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error while resolving request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let code = self.code();
        let status = self.status();
        async_graphql::Error::new(message).extend_with(move |_, e| {
            e.set("code", code);
            e.set("status", i32::from(status));
        })
    }
}
