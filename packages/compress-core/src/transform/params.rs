use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_QUALITY;
use crate::errors::MediaError;

/// 出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    WebP,
    #[default]
    Avif,
}

impl OutputFormat {
    /// フォームの `type` フィールドに入る値
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    /// 出力ファイルの拡張子（ドットなし）
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Content-Type を取得
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::WebP),
            "avif" => Ok(Self::Avif),
            other => Err(MediaError::Validation(format!(
                "type must be webp or avif, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 圧縮パラメータ
///
/// `width` が `None` のときは元の解像度を保つ（上限を超える場合のみ縮小）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    pub format: OutputFormat,
    pub quality: u8,
    pub width: Option<u32>,
}

impl CompressParams {
    pub fn new(format: OutputFormat, quality: Option<u8>, width: Option<u32>) -> Self {
        Self {
            format,
            quality: quality.unwrap_or(DEFAULT_QUALITY),
            width,
        }
    }
}

impl Default for CompressParams {
    fn default() -> Self {
        Self::new(OutputFormat::default(), None, None)
    }
}
