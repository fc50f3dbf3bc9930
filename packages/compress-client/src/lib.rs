//! 画像の一括圧縮ワークフロー
//!
//! ファイル選択と寸法の読み取り、圧縮サーバーへの送信、結果の一覧表示と
//! zip へのまとめをブラウザのフォームと同じ手順で行う。

pub mod archive;
pub mod batch;
pub mod client;
pub mod error;
pub mod options;
pub mod probe;
pub mod selection;
pub mod summary;

pub use archive::{archive_file_name, archive_offered, build_archive, write_archive};
pub use batch::{
    BatchReport, BatchRunner, BatchState, CompressedFile, DEFAULT_CONCURRENCY, FailurePolicy,
    FileReport, Outcome,
};
pub use client::{CompressClient, Compressor, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT};
pub use error::{ArchiveError, ClientError, FormError, SelectionError};
pub use options::CompressOptions;
pub use selection::{FileSelection, ProbeStatus, SelectedFile, UploadItem};
