//! プレビュー画像上の範囲選択と切り抜き

use crate::api::js_error;
use crate::camera;
use thesis_capture_common::{map_to_source, Point, Rect, Size};
use web_sys::{Element, HtmlImageElement, MouseEvent};

/// マウス位置を要素左上基準の座標に
pub fn relative_point(ev: &MouseEvent, element: &Element) -> Point {
    let bounds = element.get_bounding_client_rect();
    Point::new(
        ev.client_x() as f64 - bounds.left(),
        ev.client_y() as f64 - bounds.top(),
    )
}

/// 表示中の画像サイズ
pub fn rendered_size(img: &HtmlImageElement) -> Size {
    Size::new(img.client_width() as f64, img.client_height() as f64)
}

/// 表示座標の選択範囲で画像を切り抜き、JPEG Data URLを返す
///
/// 範囲が画像外・面積ゼロなら `None`。
pub fn crop_data_url(img: &HtmlImageElement, selection: Rect) -> Result<Option<String>, String> {
    let natural = Size::new(img.natural_width() as f64, img.natural_height() as f64);
    let Some(source) = map_to_source(selection, natural, rendered_size(img)) else {
        return Ok(None);
    };

    let (canvas, ctx) = camera::canvas(source.width, source.height)?;
    ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
        img,
        source.x as f64,
        source.y as f64,
        source.width as f64,
        source.height as f64,
        0.0,
        0.0,
        source.width as f64,
        source.height as f64,
    )
    .map_err(js_error)?;
    camera::to_jpeg(&canvas).map(Some)
}
