//! Request-scoped context threaded through handlers, the orchestrator and
//! store calls so that log lines can be attributed to one request.

use crate::types::Role;

/// Caller identity taken from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub login: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: AuthenticatedUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Login of the caller, or `anonymous` before authentication
    pub fn login(&self) -> &str {
        self.user.as_ref().map_or("anonymous", |u| u.login.as_str())
    }
}
