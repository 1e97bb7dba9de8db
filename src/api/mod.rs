//! 外部API（OCR・論文登録）

mod ocr;
mod theses;

pub use ocr::OcrClient;
pub use theses::ThesisClient;

use thesis_capture_common::{CreatedThesis, OcrResult, Result, ThesisRecord};

/// ステップ画像のOCR送信
#[allow(async_fn_in_trait)]
pub trait OcrService {
    /// 失敗時は `OcrRequestFailed`
    async fn submit(&self, step_index: usize, endpoint: &str, images: &[Vec<u8>]) -> Result<OcrResult>;
}

/// 論文レコードの登録
#[allow(async_fn_in_trait)]
pub trait ThesisBackend {
    /// 失敗時は `PersistenceFailed`
    async fn create(&self, record: &ThesisRecord) -> Result<CreatedThesis>;
}
