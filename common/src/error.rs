//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cannot access camera: {0}")]
    CameraUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrRequestFailed(String),

    #[error("Save failed: {0}")]
    PersistenceFailed(String),

    #[error("Malformed month/year: {0}")]
    MalformedDateInput(String),

    #[error("Step index out of range: {index} (steps: {len})")]
    InvalidStep { index: usize, len: usize },

    #[error("Access token is not set. Run `thesis-capture login --token <TOKEN>` first")]
    MissingToken,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
