//! ブラウザカメラ（getUserMedia）と静止画の切り出し

use crate::api::js_error;
use thesis_capture_common::{fit_width, CameraConstraints, CAPTURE_JPEG_QUALITY, CAPTURE_MAX_WIDTH};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

/// カメラを起動して映像要素に接続
///
/// 失敗時はブラウザのエラーメッセージを返す。
pub async fn start(video: &HtmlVideoElement, constraints: &CameraConstraints) -> Result<(), String> {
    let devices = gloo::utils::window()
        .navigator()
        .media_devices()
        .map_err(js_error)?;

    let constraints: MediaStreamConstraints =
        js_sys::JSON::parse(&constraints.media_constraints().to_string())
            .map_err(js_error)?
            .unchecked_into();
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(js_error)?;
    let stream: MediaStream = JsFuture::from(promise)
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;

    // iOS Safariでのインライン再生
    let _ = video.set_attribute("playsinline", "true");
    video.set_muted(true);
    video.set_src_object(Some(&stream));
    JsFuture::from(video.play().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    Ok(())
}

/// 全トラックを停止して映像要素から外す
pub fn stop(video: &HtmlVideoElement) {
    if let Some(stream) = video.src_object() {
        for track in stream.get_tracks().iter() {
            track.unchecked_into::<MediaStreamTrack>().stop();
        }
    }
    video.set_src_object(None);
}

/// 現在の映像を最大幅まで縮小してJPEGのData URLにする
pub fn snapshot(video: &HtmlVideoElement) -> Result<String, String> {
    let (width, height) = fit_width(video.video_width(), video.video_height(), CAPTURE_MAX_WIDTH);
    if width == 0 || height == 0 {
        return Err("Camera is not ready yet.".to_string());
    }

    let (canvas, ctx) = canvas(width, height)?;
    ctx.draw_image_with_html_video_element_and_dw_and_dh(
        video,
        0.0,
        0.0,
        width as f64,
        height as f64,
    )
    .map_err(js_error)?;
    to_jpeg(&canvas)
}

/// 描画用キャンバスを作成
pub fn canvas(width: u32, height: u32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), String> {
    let canvas: HtmlCanvasElement = gloo::utils::document()
        .create_element("canvas")
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(js_error)?
        .ok_or_else(|| "2D context is not available".to_string())?
        .dyn_into()
        .map_err(js_error)?;
    Ok((canvas, ctx))
}

/// キャンバスをJPEG Data URLへ
pub fn to_jpeg(canvas: &HtmlCanvasElement) -> Result<String, String> {
    let quality = JsValue::from_f64(CAPTURE_JPEG_QUALITY as f64 / 100.0);
    canvas
        .to_data_url_with_type_and_encoder_options("image/jpeg", &quality)
        .map_err(js_error)
}
