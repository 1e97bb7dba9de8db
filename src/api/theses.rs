use super::ThesisBackend;
use thesis_capture_common::{endpoint_url, CreatedThesis, Error, Result, ThesisRecord};

const CREATE_PATH: &str = "/theses/";

/// 論文登録APIクライアント
#[derive(Debug, Clone)]
pub struct ThesisClient {
    http: reqwest::Client,
    base_url: String,
}

impl ThesisClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl ThesisBackend for ThesisClient {
    async fn create(&self, record: &ThesisRecord) -> Result<CreatedThesis> {
        let url = endpoint_url(&self.base_url, CREATE_PATH);
        tracing::info!(%url, title = %record.title, "saving thesis");

        let response = self
            .http
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| Error::PersistenceFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "save rejected");
            return Err(Error::PersistenceFailed(format!("{} {}", status, body.trim())));
        }

        response
            .json::<CreatedThesis>()
            .await
            .map_err(|e| Error::PersistenceFailed(format!("invalid response: {}", e)))
    }
}
