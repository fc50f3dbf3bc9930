use thiserror::Error;

/// 圧縮リクエスト全体のエラー型
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
}

/// 画像変換エラー
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("image resolution exceeds maximum ({width}x{height})")]
    ResolutionTooLarge { width: u32, height: u32 },

    #[error("decode failed: {0}")]
    DecodeFailed(String),

    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

impl TransformError {
    /// 入力側の問題（クライアントが直せる）かどうか
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::ProcessingFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(TransformError::InvalidParams("q".into()).is_client_error());
        assert!(TransformError::DecodeFailed("bad".into()).is_client_error());
        assert!(
            TransformError::ResolutionTooLarge {
                width: 1,
                height: 1
            }
            .is_client_error()
        );
        assert!(!TransformError::ProcessingFailed("oom".into()).is_client_error());
    }

    #[test]
    fn test_media_error_from_transform() {
        let err: MediaError = TransformError::DecodeFailed("truncated".into()).into();
        assert_eq!(err.to_string(), "transform error: decode failed: truncated");
    }
}
