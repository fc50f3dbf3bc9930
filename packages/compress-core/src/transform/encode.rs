use crate::constants::AVIF_ENCODE_SPEED;
use crate::errors::TransformError;
use crate::transform::params::OutputFormat;
use image::DynamicImage;
use image::codecs::avif::AvifEncoder;
use std::io::Cursor;

/// 画像を指定フォーマット・品質でエンコードする
pub fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, TransformError> {
    match format {
        OutputFormat::WebP => encode_webp(img, quality),
        OutputFormat::Avif => encode_avif(img, quality),
    }
}

/// image クレートの WebP エンコーダはロスレスのみのため、libwebp で非可逆圧縮する
fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, TransformError> {
    let (width, height) = (img.width(), img.height());
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, quality as f32)
            .map(|memory| memory.to_vec())
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(false, quality as f32)
            .map(|memory| memory.to_vec())
    };

    encoded.map_err(|e| TransformError::ProcessingFailed(format!("WebP encode failed: {e:?}")))
}

fn encode_avif(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, TransformError> {
    let mut buf = Cursor::new(Vec::new());
    let encoder = AvifEncoder::new_with_speed_quality(&mut buf, AVIF_ENCODE_SPEED, quality);

    // AVIF エンコーダは 8bit RGB / RGBA を受け付ける
    let prepared = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    prepared
        .write_with_encoder(encoder)
        .map_err(|e| TransformError::ProcessingFailed(format!("AVIF encode failed: {e}")))?;

    Ok(buf.into_inner())
}
