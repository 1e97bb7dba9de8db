//! 撮影画像の縮小・JPEG化・切り抜き

use crate::error::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;
use thesis_capture_common::{fit_width, map_to_source, Rect, Size, SourceRect};

/// 撮影画像を最大幅まで縮小してJPEG化
pub fn prepare_capture(image: &DynamicImage, max_width: u32, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = fit_width(image.width(), image.height(), max_width);
    if (width, height) == (image.width(), image.height()) {
        return encode_jpeg(image, quality);
    }
    let resized = image.resize_exact(width, height, FilterType::Triangle);
    encode_jpeg(&resized, quality)
}

pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.encode_image(&image.to_rgb8())?;
    Ok(buffer)
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// 元画像のピクセル矩形で切り抜き
pub fn crop_image(image: &DynamicImage, rect: SourceRect) -> DynamicImage {
    image.crop_imm(rect.x, rect.y, rect.width, rect.height)
}

/// 表示座標の選択範囲で撮影画像を切り抜く
///
/// `rendered` は選択時のプレビュー表示サイズ。範囲が画像外なら元画像をそのまま返す。
pub fn crop_capture(bytes: &[u8], selection: Rect, rendered: Size, quality: u8) -> Result<Vec<u8>> {
    let image = decode(bytes)?;
    let natural = Size::new(image.width() as f64, image.height() as f64);

    match map_to_source(selection, natural, rendered) {
        Some(rect) => {
            tracing::debug!(?rect, "crop mapped to source");
            encode_jpeg(&crop_image(&image, rect), quality)
        }
        None => Ok(bytes.to_vec()),
    }
}

/// 抽出に送る画像を準備（縮小、範囲指定があれば切り抜き）
///
/// `rendered` を省略した場合、範囲は元画像（縮小前）のピクセル座標。
pub fn prepare_extract(
    image: &DynamicImage,
    crop: Option<(Rect, Option<Size>)>,
    max_width: u32,
    quality: u8,
) -> Result<Vec<u8>> {
    let bytes = prepare_capture(image, max_width, quality)?;
    let Some((selection, rendered)) = crop else {
        return Ok(bytes);
    };
    let rendered =
        rendered.unwrap_or_else(|| Size::new(image.width() as f64, image.height() as f64));
    crop_capture(&bytes, selection, rendered, quality)
}

/// 範囲選択用プレビューを書き出し、その表示サイズを返す
pub fn write_preview(bytes: &[u8], preview_width: u32, path: &Path) -> Result<Size> {
    let image = decode(bytes)?;
    let (width, height) = fit_width(image.width(), image.height(), preview_width);
    let preview = image.resize_exact(width, height, FilterType::Triangle);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, encode_jpeg(&preview, 85)?)?;
    Ok(Size::new(width as f64, height as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn sample(width: u32, height: u32) -> DynamicImage {
        // 左半分を黒、右半分を白
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_prepare_capture_downscales() {
        let bytes = prepare_capture(&sample(1600, 1200), 800, 80).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (800, 600));
    }

    #[test]
    fn test_prepare_capture_keeps_small_images() {
        let bytes = prepare_capture(&sample(320, 240), 800, 80).unwrap();
        assert_eq!(decode(&bytes).unwrap().dimensions(), (320, 240));
    }

    #[test]
    fn test_crop_capture_maps_preview_coordinates() {
        let bytes = encode_jpeg(&sample(800, 600), 90).unwrap();
        // プレビュー 400x300 上で右半分を選択
        let selection = Rect { x: 200.0, y: 0.0, width: 200.0, height: 300.0 };
        let cropped = crop_capture(&bytes, selection, Size::new(400.0, 300.0), 90).unwrap();
        let decoded = decode(&cropped).unwrap();
        assert_eq!(decoded.dimensions(), (400, 600));
        let pixel = decoded.to_rgb8().get_pixel(200, 300).0;
        assert!(pixel[0] > 200);
    }

    #[test]
    fn test_crop_capture_outside_returns_original() {
        let bytes = encode_jpeg(&sample(100, 100), 90).unwrap();
        let selection = Rect { x: 500.0, y: 500.0, width: 10.0, height: 10.0 };
        let result = crop_capture(&bytes, selection, Size::new(100.0, 100.0), 90).unwrap();
        assert_eq!(result, bytes);
    }

    #[test]
    fn test_prepare_extract_crop_in_original_pixels() {
        // 1600x1200 の右半分を元画像座標で指定
        let selection = Rect { x: 800.0, y: 0.0, width: 800.0, height: 1200.0 };
        let bytes = prepare_extract(&sample(1600, 1200), Some((selection, None)), 800, 90).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (400, 600));
        assert!(decoded.to_rgb8().get_pixel(200, 300).0[0] > 200);
    }

    #[test]
    fn test_prepare_extract_crop_in_rendered_space() {
        let selection = Rect { x: 0.0, y: 0.0, width: 200.0, height: 300.0 };
        let rendered = Some(Size::new(400.0, 300.0));
        let bytes = prepare_extract(&sample(1600, 1200), Some((selection, rendered)), 800, 90).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (400, 600));
        assert!(decoded.to_rgb8().get_pixel(200, 300).0[0] < 50);
    }

    #[test]
    fn test_prepare_extract_without_crop() {
        let bytes = prepare_extract(&sample(1600, 1200), None, 800, 80).unwrap();
        assert_eq!(decode(&bytes).unwrap().dimensions(), (800, 600));
    }

    #[test]
    fn test_write_preview_size() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = encode_jpeg(&sample(800, 600), 90).unwrap();
        let path = dir.path().join("preview").join("current.jpg");
        let size = write_preview(&bytes, 400, &path).unwrap();
        assert_eq!(size, Size::new(400.0, 300.0));
        assert!(path.exists());
    }
}
