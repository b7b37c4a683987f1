//! Parsing of the OAuth redirect that carries the authorization code.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::error::AuthError;

pub const DEFAULT_REDIRECT_SCHEME: &str = "charliesbotrssapp";
pub const DEFAULT_REDIRECT_HOST: &str = "oauth";

/// Scheme and host the authorization server redirects back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    pub scheme: String,
    pub host: String,
}

impl Default for RedirectTarget {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_REDIRECT_SCHEME.to_string(),
            host: DEFAULT_REDIRECT_HOST.to_string(),
        }
    }
}

impl RedirectTarget {
    /// Extract the `code` query parameter from a redirect URI.
    ///
    /// # Example
    /// ```
    /// use ares::auth::RedirectTarget;
    ///
    /// let target = RedirectTarget::default();
    /// let code = target.extract_code("charliesbotrssapp://oauth?code=abc123")?;
    /// assert_eq!(code, "abc123");
    /// # Ok::<(), ares::auth::AuthError>(())
    /// ```
    pub fn extract_code(&self, uri: &str) -> Result<String, AuthError> {
        let url = Url::parse(uri.trim())
            .map_err(|e| AuthError::InvalidArgument(format!("Malformed redirect URI: {e}")))?;
        if !url.scheme().eq_ignore_ascii_case(&self.scheme)
            || !url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
        {
            return Err(AuthError::InvalidArgument(format!(
                "Unexpected redirect target: expected {}://{}",
                self.scheme, self.host
            )));
        }

        let mut code = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error" => {
                    return Err(AuthError::InvalidArgument(format!(
                        "Authorization was not granted: {value}"
                    )));
                }
                "code" => code = Some(value.into_owned()),
                _ => {}
            }
        }
        code.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            AuthError::InvalidArgument("Redirect URI carries no authorization code".to_string())
        })
    }
}
