//! Thesis Capture Common Library
//!
//! CLIとWeb(WASM)で共有される撮影ワークフロー・座標変換・レコード型

pub mod camera;
pub mod crop;
pub mod date;
pub mod error;
pub mod ocr;
pub mod record;
pub mod steps;
pub mod workflow;

pub use camera::{CameraConstraints, CAPTURE_JPEG_QUALITY, CAPTURE_MAX_WIDTH};
pub use crop::{fit_width, map_to_source, CropSelector, Point, Rect, Size, SourceRect};
pub use date::{convert_month_year_to_date, format_long_date, parse_month_year};
pub use error::{Error, Result};
pub use ocr::{endpoint_url, format_accuracy, image_part_name, OcrResult, DEFAULT_API_BASE_URL};
pub use record::{
    Accuracy, CreatedThesis, HistoryEntry, HistoryLog, ThesisForm, ThesisRecord, HISTORY_KEY,
};
pub use steps::{instruction, Step, StepPlan};
pub use workflow::{
    saved_notices, AdvancePolicy, CaptureSet, Effect, ExtractRequest, Mode, Notice, NoticeLevel,
    RegionStrategy, StepCaptures, ViewState, Workflow,
};
