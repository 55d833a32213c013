use axum::http::{header, HeaderMap};

/// Session-presence check guarding the admin surface.
pub trait AdminSessions: Send + Sync {
    fn is_authenticated(&self, bearer_token: &str) -> bool;
}

/// Accepts a single pre-shared bearer token. With no token configured
/// every request is rejected.
#[derive(Clone, Default)]
pub struct StaticTokenSessions {
    token: Option<String>,
}

impl StaticTokenSessions {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|value| !value.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for StaticTokenSessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenSessions")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AdminSessions for StaticTokenSessions {
    fn is_authenticated(&self, bearer_token: &str) -> bool {
        match &self.token {
            Some(expected) => constant_time_eq(expected.as_bytes(), bearer_token.as_bytes()),
            None => false,
        }
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
