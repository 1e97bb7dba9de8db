//! カメラ取得条件と撮影画像の既定値

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 撮影画像の最大幅（px）
pub const CAPTURE_MAX_WIDTH: u32 = 800;

/// 撮影画像のJPEG品質（0-100）
pub const CAPTURE_JPEG_QUALITY: u8 = 80;

/// カメラ取得条件（いずれも希望値）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    /// 幅/高さ。A4縦 = 1 / 1.414
    pub aspect_ratio: f64,
    pub facing_mode: String,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            aspect_ratio: 1.0 / 1.414,
            facing_mode: "environment".to_string(),
        }
    }
}

impl CameraConstraints {
    /// `getUserMedia` に渡す制約オブジェクト
    pub fn media_constraints(&self) -> Value {
        json!({
            "audio": false,
            "video": {
                "width": { "ideal": self.ideal_width },
                "height": { "ideal": self.ideal_height },
                "aspectRatio": { "ideal": self.aspect_ratio },
                "facingMode": { "ideal": self.facing_mode },
            }
        })
    }
}
