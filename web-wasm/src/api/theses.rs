//! 論文登録API

use super::{js_error, send};
use thesis_capture_common::{endpoint_url, CreatedThesis, ThesisRecord};
use wasm_bindgen::JsValue;
use web_sys::{RequestInit, RequestMode};

const CREATE_PATH: &str = "/theses/";

pub async fn create_thesis(base_url: &str, record: &ThesisRecord) -> Result<CreatedThesis, String> {
    let body = serde_json::to_string(record).map_err(|e| e.to_string())?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(&body));

    let url = endpoint_url(base_url, CREATE_PATH);
    let (status, text) = send(&url, &init, Some("application/json")).await?;
    if !(200..300).contains(&status) {
        return Err(format!("{} {}", status, text.trim()));
    }

    let value = js_sys::JSON::parse(&text).map_err(js_error)?;
    serde_wasm_bindgen::from_value(value).map_err(|e| e.to_string())
}
