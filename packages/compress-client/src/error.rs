use thiserror::Error;

/// 圧縮サーバーへのリクエストエラー
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// サーバーが返したエラー記述子
    #[error("server rejected the image ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// ファイル選択時のエラー
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Please select a valid file")]
    Rejected { names: Vec<String> },
}

/// 送信前のフォーム検証エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("No files selected")]
    NoFilesSelected,

    #[error("{0}")]
    InvalidOption(String),
}

/// zip 作成エラー
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("nothing to archive")]
    Empty,

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
