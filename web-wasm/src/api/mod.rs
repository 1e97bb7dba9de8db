//! 外部API（OCR・論文登録）
//!
//! 撮影画像はData URLで保持し、送信時にBlobへ戻す。

pub mod ocr;
pub mod theses;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出（失敗時は "image/jpeg"）
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("image/jpeg")
}

/// Data URLをバイト列に戻す
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let data = extract_base64_from_data_url(data_url)
        .ok_or_else(|| "invalid data URL".to_string())?;
    STANDARD.decode(data).map_err(|e| e.to_string())
}

/// fetchを実行し、ステータスと本文を返す
async fn send(url: &str, init: &RequestInit, content_type: Option<&str>) -> Result<(u16, String), String> {
    let request = Request::new_with_str_and_init(url, init).map_err(js_error)?;
    if let Some(content_type) = content_type {
        request
            .headers()
            .set("Content-Type", content_type)
            .map_err(js_error)?;
    }

    let resp_value = JsFuture::from(gloo::utils::window().fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let resp: Response = resp_value.dyn_into().map_err(js_error)?;

    let text = JsFuture::from(resp.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();
    Ok((resp.status(), text))
}

/// JSの例外を表示用の文字列に
pub(crate) fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_base64_from_data_url_jpeg() {
        let data_url = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";
        assert_eq!(extract_base64_from_data_url(data_url), Some("/9j/4AAQSkZJRg=="));
    }

    #[test]
    fn test_extract_base64_from_data_url_invalid() {
        assert_eq!(extract_base64_from_data_url("not a data url"), None);
        assert_eq!(extract_base64_from_data_url(""), None);
    }

    #[test]
    fn test_extract_mime_type() {
        assert_eq!(extract_mime_type_from_data_url("data:image/png;base64,iVBORw0KGgo="), "image/png");
        assert_eq!(extract_mime_type_from_data_url("data:image/jpeg;base64,/9j/"), "image/jpeg");
        // 不正なフォーマットの場合はデフォルト値を返す
        assert_eq!(extract_mime_type_from_data_url("invalid"), "image/jpeg");
    }

    #[test]
    fn test_decode_data_url() {
        // "JPEG" をBase64化したもの
        let bytes = decode_data_url("data:image/jpeg;base64,SlBFRw==").unwrap();
        assert_eq!(bytes, b"JPEG");
        assert!(decode_data_url("data:image/jpeg;base64,@@@").is_err());
        assert!(decode_data_url("no comma").is_err());
    }
}
