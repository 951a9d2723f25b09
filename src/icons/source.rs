use async_trait::async_trait;
use reqwest::StatusCode;

use super::IconError;

/// Where issue-type SVGs come from.
#[async_trait]
pub trait IconSource: Send + Sync {
    /// Fetch the SVG markup at `url`. `Ok(None)` means the server has no such icon.
    async fn fetch_svg(&self, url: &str) -> Result<Option<String>, IconError>;
}

pub struct HttpIconSource {
    client: reqwest::Client,
}

impl HttpIconSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpIconSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IconSource for HttpIconSource {
    async fn fetch_svg(&self, url: &str) -> Result<Option<String>, IconError> {
        let resp = self
            .client
            .get(url)
            .header("Accept", "image/svg+xml")
            .send()
            .await
            .map_err(|e| IconError::Fetch(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let resp = resp
            .error_for_status()
            .map_err(|e| IconError::Fetch(e.to_string()))?;
        let body = resp
            .text()
            .await
            .map_err(|e| IconError::Fetch(e.to_string()))?;
        Ok(Some(body))
    }
}
