//! OCRレスポンスの型とリクエスト組み立て補助
//!
//! レスポンスはステップごとに異なる項目キー + `accuracy`（%）のJSONオブジェクト。

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// OCR・論文登録APIの既定ベースURL
pub const DEFAULT_API_BASE_URL: &str = "https://web-production-bfdc1d.up.railway.app";

/// multipartの画像フィールド名
pub const IMAGES_FIELD: &str = "images";

/// 画像パートのMIMEタイプ
pub const IMAGE_MIME: &str = "image/jpeg";

/// OCR結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrResult {
    fields: Map<String, Value>,
    accuracy: Option<f64>,
}

impl OcrResult {
    /// レスポンス本文をパース
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(Error::OcrRequestFailed(
                "response is not a JSON object".into(),
            ));
        };

        let accuracy = fields.remove("accuracy").and_then(|v| number_of(&v));
        Ok(Self { fields, accuracy })
    }

    /// 項目値を文字列で取得（null/未設定は `None`）
    pub fn field(&self, key: &str) -> Option<String> {
        let value = self.fields.get(key)?;
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// 表示用にJSONオブジェクトへ戻す
    pub fn to_value(&self) -> Value {
        let mut fields = self.fields.clone();
        if let Some(accuracy) = self.accuracy {
            fields.insert("accuracy".to_string(), Value::from(accuracy));
        }
        Value::Object(fields)
    }

    /// テスト・再生用のビルダー
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

/// ベースURLとエンドポイントパスを結合
pub fn endpoint_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// 画像パートのファイル名（例: step1_page2.jpg）
pub fn image_part_name(step_index: usize, page_index: usize) -> String {
    format!("step{}_page{}.jpg", step_index + 1, page_index + 1)
}

/// 精度表示（例: "92%"、なしは "N/A"）
pub fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(a) => format!("{}%", a),
        None => "N/A".to_string(),
    }
}
