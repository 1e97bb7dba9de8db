//! 切り抜き範囲の選択と座標変換
//!
//! 画面上でドラッグした矩形を、表示サイズと元画像サイズの比で
//! 元画像のピクセル座標へ変換する。縦横の比率は独立に扱う。

use serde::{Deserialize, Serialize};

/// 画面上の座標
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 幅・高さ
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// 画面座標系の矩形（左上原点）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// 2点から矩形を作る（ドラッグ方向に依存しない）
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// 0..bounds の範囲に収める
    pub fn clamp_to(&self, bounds: Size) -> Self {
        let x0 = self.x.clamp(0.0, bounds.width);
        let y0 = self.y.clamp(0.0, bounds.height);
        let x1 = (self.x + self.width).clamp(0.0, bounds.width);
        let y1 = (self.y + self.height).clamp(0.0, bounds.height);
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// 元画像のピクセル矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// ドラッグによる範囲選択
///
/// ドラッグ中のみ矩形が更新され、終了後は確定した矩形を保持する。
#[derive(Debug, Clone, Default)]
pub struct CropSelector {
    origin: Option<Point>,
    current: Option<Point>,
    dragging: bool,
}

impl CropSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以前の矩形を破棄して新しい選択を開始
    pub fn begin_selection(&mut self, position: Point) {
        self.origin = Some(position);
        self.current = Some(position);
        self.dragging = true;
    }

    pub fn update_selection(&mut self, position: Point) {
        if self.dragging {
            self.current = Some(position);
        }
    }

    /// 選択を確定（矩形がなければ何もしない）
    pub fn end_selection(&mut self) {
        if self.origin.is_none() {
            return;
        }
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// 現在の矩形（面積0は未選択扱い）
    pub fn rectangle(&self) -> Option<Rect> {
        let rect = Rect::from_corners(self.origin?, self.current?);
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 表示座標の矩形を元画像のピクセル矩形へ変換
///
/// `natural` は元画像サイズ、`rendered` は画面上の表示サイズ。
/// 結果は元画像の範囲内に収まる。表示サイズが0、または変換後の面積が0なら `None`。
pub fn map_to_source(rect: Rect, natural: Size, rendered: Size) -> Option<SourceRect> {
    if natural.is_degenerate() || rendered.is_degenerate() {
        return None;
    }

    let rect = rect.clamp_to(rendered);
    let scale_x = natural.width / rendered.width;
    let scale_y = natural.height / rendered.height;

    let max_w = natural.width.round() as u32;
    let max_h = natural.height.round() as u32;

    let x = ((rect.x * scale_x).round() as u32).min(max_w);
    let y = ((rect.y * scale_y).round() as u32).min(max_h);
    let width = ((rect.width * scale_x).round() as u32).min(max_w - x);
    let height = ((rect.height * scale_y).round() as u32).min(max_h - y);

    if width == 0 || height == 0 {
        return None;
    }

    Some(SourceRect { x, y, width, height })
}

/// 最大幅に収まる縮小後サイズ（縦横比維持、拡大はしない）
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scale = max_width as f64 / width as f64;
    let scaled_height = ((height as f64 * scale).round() as u32).max(1);
    (max_width, scaled_height)
}
