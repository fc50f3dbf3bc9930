use compress_core::{
    CompressParams, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY, OutputFormat, QUALITY_STEP,
    validate_params,
};

use crate::error::FormError;

/// 圧縮オプション（フォーマット切替・品質スライダー・幅入力）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    pub format: OutputFormat,
    pub quality: u8,
    pub width: Option<u32>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: DEFAULT_QUALITY,
            width: None,
        }
    }
}

impl CompressOptions {
    pub fn new(format: OutputFormat, quality: u8, width: Option<u32>) -> Result<Self, FormError> {
        let options = Self {
            format,
            quality,
            width,
        };
        options.validate()?;
        Ok(options)
    }

    /// スライダーと同じく 5 刻み・5〜100 に丸めて品質を設定する
    pub fn set_quality_from_slider(&mut self, value: u8) {
        let clamped = value.clamp(MIN_QUALITY, MAX_QUALITY);
        let snapped = ((clamped as u32 + QUALITY_STEP as u32 / 2) / QUALITY_STEP as u32)
            * QUALITY_STEP as u32;
        self.quality = (snapped as u8).clamp(MIN_QUALITY, MAX_QUALITY);
    }

    pub fn validate(&self) -> Result<(), FormError> {
        validate_params(&self.to_params()).map_err(|e| FormError::InvalidOption(e.to_string()))
    }

    pub fn to_params(&self) -> CompressParams {
        CompressParams::new(self.format, Some(self.quality), self.width)
    }

    /// フォームの `quality` フィールド値
    pub fn quality_field(&self) -> String {
        self.quality.to_string()
    }

    /// フォームの `width` フィールド値（未指定は空文字）
    pub fn width_field(&self) -> String {
        self.width.map(|w| w.to_string()).unwrap_or_default()
    }
}
