//! OCR API
//!
//! `POST <base>/ocr/<step>/` にステップの画像をmultipartで送る。

use super::{decode_data_url, extract_mime_type_from_data_url, js_error, send};
use thesis_capture_common::ocr::IMAGES_FIELD;
use thesis_capture_common::{endpoint_url, image_part_name, OcrResult};
use web_sys::{Blob, BlobPropertyBag, FormData, RequestInit, RequestMode};

/// Data URLをBlobに変換
fn data_url_to_blob(data_url: &str) -> Result<Blob, String> {
    let bytes = decode_data_url(data_url)?;
    let array = js_sys::Uint8Array::from(bytes.as_slice());
    let parts = js_sys::Array::of1(&array);

    let options = BlobPropertyBag::new();
    options.set_type(extract_mime_type_from_data_url(data_url));
    Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)
}

/// ステップの画像を送信して結果を受け取る
///
/// 失敗時は通知用のエラー詳細を返す。
pub async fn submit_step(
    base_url: &str,
    step_index: usize,
    endpoint: &str,
    images: &[String],
) -> Result<OcrResult, String> {
    let form = FormData::new().map_err(js_error)?;
    for (page, data_url) in images.iter().enumerate() {
        let blob = data_url_to_blob(data_url)?;
        form.append_with_blob_and_filename(IMAGES_FIELD, &blob, &image_part_name(step_index, page))
            .map_err(js_error)?;
    }

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&form);

    let url = endpoint_url(base_url, endpoint);
    let (status, body) = send(&url, &init, None).await?;
    if !(200..300).contains(&status) {
        web_sys::console::error_1(&format!("OCR error {}: {}", status, body).into());
        return Err(if body.trim().is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        });
    }

    OcrResult::from_json(&body).map_err(|e| e.to_string())
}
