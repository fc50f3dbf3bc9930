use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::errors::TransformError;

/// EXIF Orientation（1〜8）
///
/// 5〜8 は 90 度系の回転を含むため、表示上の幅と高さが入れ替わる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation(u8);

impl Orientation {
    pub const NORMAL: Self = Self(1);

    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1..=8 => Some(Self(value as u8)),
            _ => None,
        }
    }

    pub fn value(&self) -> u8 {
        self.0.max(1)
    }

    pub fn swaps_axes(&self) -> bool {
        self.value() >= 5
    }

    /// 画素を表示向きに揃える
    pub fn apply(&self, img: DynamicImage) -> DynamicImage {
        match self.value() {
            2 => img.fliph(),
            3 => img.rotate180(),
            4 => img.flipv(),
            5 => img.rotate90().fliph(),
            6 => img.rotate90(),
            7 => img.rotate270().fliph(),
            8 => img.rotate270(),
            _ => img,
        }
    }

    /// 格納上の寸法を表示上の寸法に変換する
    pub fn display_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// バイト列から EXIF Orientation を読む。タグがなければ `None`
pub fn read_orientation(data: &[u8]) -> Option<Orientation> {
    let mut cursor = Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    Orientation::from_exif(field.value.get_uint(0)?)
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, TransformError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransformError::DecodeFailed(format!("failed to guess format: {e}")))
}

/// 画像をデコードし、EXIF の向きを適用した画像と元フォーマットを返す
pub fn decode_image(data: &[u8]) -> Result<(DynamicImage, Option<ImageFormat>), TransformError> {
    let reader = reader(data)?;
    let source_format = reader.format();
    if source_format.is_none() {
        return Err(TransformError::DecodeFailed("unrecognized image format".to_string()));
    }

    let img = reader
        .decode()
        .map_err(|e| TransformError::DecodeFailed(e.to_string()))?;

    let orientation = read_orientation(data).unwrap_or_default();
    Ok((orientation.apply(img), source_format))
}

/// ヘッダーだけを読んで表示上の幅・高さを返す（画素はデコードしない）
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), TransformError> {
    let reader = reader(data)?;
    if reader.format().is_none() {
        return Err(TransformError::DecodeFailed("unrecognized image format".to_string()));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| TransformError::DecodeFailed(e.to_string()))?;

    let orientation = read_orientation(data).unwrap_or_default();
    Ok(orientation.display_dimensions(width, height))
}
