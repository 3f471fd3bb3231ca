use reqwest::Url;

use crate::error::{GatewayError, GatewayResult};

/// Root URL of one backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl BaseUrl {
    /// Accepts absolute http(s) URLs only.
    pub fn parse(raw: &str) -> GatewayResult<Self> {
        let url = Url::parse(raw.trim()).map_err(|_| GatewayError::InvalidUrl(raw.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidUrl(raw.to_string()));
        }
        Ok(Self(raw.trim().trim_end_matches('/').to_string()))
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> String {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        format!("{}/{}", trimmed_url, trimmed_path)
    }
}
