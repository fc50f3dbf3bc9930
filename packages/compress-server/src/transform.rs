use bytes::Bytes;

use compress_core::constants::MAX_ENCODE_DIMENSION;
use compress_core::{
    CompressParams, MAX_PIXELS, OutputFormat, TransformError, calculate_target_dimensions,
    decode_image, encode_image, resize_image, validate_params,
};

/// 圧縮結果
#[derive(Debug, Clone)]
pub struct CompressOutput {
    pub bytes: Bytes,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl CompressOutput {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// 画像バイト列を指定パラメータで再エンコードする。
///
/// 幅指定があればその幅に合わせ（縦横比は維持）、なければ長辺を
/// `max_dimension` 以内に収める。デコード→エンコードを必ず通るため
/// EXIF などのメタデータは出力に残らない。
pub fn transform(
    input: &[u8],
    params: &CompressParams,
    max_dimension: u32,
) -> Result<CompressOutput, TransformError> {
    validate_params(params)?;

    let (img, source_format) = decode_image(input)?;
    let (src_w, src_h) = (img.width(), img.height());
    validate_source_dimensions(src_w, src_h)?;

    let (dst_w, dst_h) = calculate_target_dimensions(src_w, src_h, params.width, max_dimension);
    validate_output_dimensions(dst_w, dst_h)?;

    tracing::debug!(
        source_format = ?source_format,
        src_w,
        src_h,
        dst_w,
        dst_h,
        "resolved output dimensions"
    );

    let resized = if (dst_w, dst_h) != (src_w, src_h) {
        resize_image(&img, dst_w, dst_h)?
    } else {
        img
    };

    let encoded = encode_image(&resized, params.format, params.quality)?;

    Ok(CompressOutput {
        bytes: Bytes::from(encoded),
        format: params.format,
        width: dst_w,
        height: dst_h,
    })
}

/// ソース画像の総ピクセル数を検証し、メモリ枯渇を防ぐ
fn validate_source_dimensions(width: u32, height: u32) -> Result<(), TransformError> {
    if width as u64 * height as u64 > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge { width, height });
    }
    Ok(())
}

/// 出力画像がエンコーダの上限に収まるか検証する
fn validate_output_dimensions(width: u32, height: u32) -> Result<(), TransformError> {
    if width > MAX_ENCODE_DIMENSION
        || height > MAX_ENCODE_DIMENSION
        || width as u64 * height as u64 > MAX_PIXELS
    {
        return Err(TransformError::ResolutionTooLarge { width, height });
    }
    Ok(())
}
