use crate::constants::{MAX_QUALITY, MAX_TARGET_WIDTH, MIN_QUALITY};
use crate::errors::{MediaError, TransformError};
use crate::transform::{CompressParams, OutputFormat};

/// 品質文字列を整数として解釈し、範囲を検証する
pub fn parse_quality(raw: &str) -> Result<u8, MediaError> {
    let trimmed = raw.trim();
    let quality: u32 = trimmed.parse().map_err(|_| {
        MediaError::Validation(format!("quality must be an integer, got {trimmed:?}"))
    })?;

    if !(MIN_QUALITY as u32..=MAX_QUALITY as u32).contains(&quality) {
        return Err(MediaError::Validation(format!(
            "quality must be {MIN_QUALITY}-{MAX_QUALITY}, got {quality}"
        )));
    }
    Ok(quality as u8)
}

/// 幅文字列を解釈する。空文字や未指定は「リサイズなし」
pub fn parse_width(raw: Option<&str>) -> Result<Option<u32>, MediaError> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let width: u32 = trimmed.parse().map_err(|_| {
        MediaError::Validation(format!("width must be a positive integer, got {trimmed:?}"))
    })?;

    if width == 0 || width > MAX_TARGET_WIDTH {
        return Err(MediaError::Validation(format!(
            "width must be 1-{MAX_TARGET_WIDTH}, got {width}"
        )));
    }
    Ok(Some(width))
}

/// フォームの文字列フィールドから圧縮パラメータを組み立てる
pub fn parse_params(
    format: &str,
    quality: &str,
    width: Option<&str>,
) -> Result<CompressParams, MediaError> {
    let format: OutputFormat = format.parse()?;
    let quality = parse_quality(quality)?;
    let width = parse_width(width)?;

    Ok(CompressParams::new(format, Some(quality), width))
}

/// 組み立て済みのパラメータを検証する
pub fn validate_params(params: &CompressParams) -> Result<(), TransformError> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&params.quality) {
        return Err(TransformError::InvalidParams(format!(
            "quality must be {MIN_QUALITY}-{MAX_QUALITY}, got {}",
            params.quality
        )));
    }

    if let Some(w) = params.width
        && (w == 0 || w > MAX_TARGET_WIDTH)
    {
        return Err(TransformError::InvalidParams(format!(
            "width must be 1-{MAX_TARGET_WIDTH}, got {w}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("75").unwrap(), 75);
        assert_eq!(parse_quality(" 5 ").unwrap(), 5);
        assert_eq!(parse_quality("100").unwrap(), 100);
        assert!(parse_quality("4").is_err());
        assert!(parse_quality("101").is_err());
        assert!(parse_quality("high").is_err());
        assert!(parse_quality("").is_err());
        assert!(parse_quality("-10").is_err());
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width(None).unwrap(), None);
        assert_eq!(parse_width(Some("")).unwrap(), None);
        assert_eq!(parse_width(Some("  ")).unwrap(), None);
        assert_eq!(parse_width(Some("800")).unwrap(), Some(800));
        assert!(parse_width(Some("0")).is_err());
        assert!(parse_width(Some("9000")).is_err());
        assert!(parse_width(Some("12.5")).is_err());
        assert!(parse_width(Some("wide")).is_err());
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params("webp", "75", Some("800")).unwrap();
        assert_eq!(params.format, OutputFormat::WebP);
        assert_eq!(params.quality, 75);
        assert_eq!(params.width, Some(800));

        let params = parse_params("avif", "40", Some("")).unwrap();
        assert_eq!(params.format, OutputFormat::Avif);
        assert_eq!(params.width, None);

        assert!(matches!(
            parse_params("gif", "75", None),
            Err(MediaError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_params() {
        assert!(validate_params(&CompressParams::default()).is_ok());
        let mut params = CompressParams::default();
        params.quality = 0;
        assert!(validate_params(&params).is_err());

        let mut params = CompressParams::default();
        params.width = Some(0);
        assert!(validate_params(&params).is_err());
    }
}
