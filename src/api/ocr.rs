use super::OcrService;
use reqwest::multipart::{Form, Part};
use thesis_capture_common::ocr::{IMAGES_FIELD, IMAGE_MIME};
use thesis_capture_common::{endpoint_url, image_part_name, Error, OcrResult, Result};

/// OCR APIクライアント
///
/// `POST <base>/ocr/<step>/` に画像をmultipart（`images` フィールド）で送る。
#[derive(Debug, Clone)]
pub struct OcrClient {
    http: reqwest::Client,
    base_url: String,
}

impl OcrClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn build_form(step_index: usize, images: &[Vec<u8>]) -> Result<Form> {
        let mut form = Form::new();
        for (page, bytes) in images.iter().enumerate() {
            let part = Part::bytes(bytes.clone())
                .file_name(image_part_name(step_index, page))
                .mime_str(IMAGE_MIME)
                .map_err(|e| Error::OcrRequestFailed(e.to_string()))?;
            form = form.part(IMAGES_FIELD, part);
        }
        Ok(form)
    }
}

impl OcrService for OcrClient {
    async fn submit(&self, step_index: usize, endpoint: &str, images: &[Vec<u8>]) -> Result<OcrResult> {
        let url = endpoint_url(&self.base_url, endpoint);
        let form = Self::build_form(step_index, images)?;

        tracing::info!(%url, step = step_index + 1, pages = images.len(), "submitting OCR request");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::OcrRequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::OcrRequestFailed(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(%status, "OCR request rejected");
            let detail = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(Error::OcrRequestFailed(detail));
        }

        let result = OcrResult::from_json(&body)
            .map_err(|e| Error::OcrRequestFailed(format!("invalid response: {}", e)))?;
        tracing::info!(accuracy = ?result.accuracy(), "OCR complete");
        Ok(result)
    }
}
