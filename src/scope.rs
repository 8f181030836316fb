//! Scope predicates
//!
//! Pure string-prefix logic deciding which URIs the guard touches. The
//! login endpoint is exempt from both injection and invalidation, so a
//! rejected login can never recurse into another login.

/// Decides whether a URI belongs to the protected target and whether it
/// is the login endpoint itself.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    base_url: String,
    login_url: String,
    login_path: String,
}

impl ScopeFilter {
    /// Build a filter for `base_url` with the login endpoint at
    /// `login_path`. The base URL is normalized without a trailing slash
    /// and the path with a leading one.
    pub fn new(base_url: &str, login_path: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let login_path = if login_path.starts_with('/') {
            login_path.to_string()
        } else {
            format!("/{login_path}")
        };
        let login_url = format!("{base_url}{login_path}");

        Self {
            base_url,
            login_url,
            login_path,
        }
    }

    /// True when `uri` targets the protected host.
    pub fn in_scope(&self, uri: &str) -> bool {
        uri.starts_with(&self.base_url)
    }

    /// True when `uri` is the login endpoint itself.
    pub fn is_login_endpoint(&self, uri: &str) -> bool {
        uri.starts_with(&self.login_url)
    }

    /// True when a redirect `Location` points back into the login flow.
    /// Matches absolute and relative targets alike.
    pub fn is_login_redirect(&self, location: &str) -> bool {
        location.contains(&self.login_path)
    }

    /// Full URL of the login endpoint.
    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}
