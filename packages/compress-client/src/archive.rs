use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use compress_core::ARCHIVE_NAME;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::{BatchReport, CompressedFile};
use crate::error::ArchiveError;

/// まとめてダウンロードを出すかどうか（成功が 2 件以上）
pub fn archive_offered(report: &BatchReport) -> bool {
    report.success_count() > 1
}

/// ダウンロードされる zip のファイル名
pub fn archive_file_name() -> String {
    format!("{ARCHIVE_NAME}.zip")
}

/// 成功した結果を `optimized_images/` フォルダ配下にまとめた zip を作る
///
/// 画像は圧縮済みのため無圧縮（Stored）で格納する。
pub fn build_archive<'a>(
    files: impl IntoIterator<Item = &'a CompressedFile>,
) -> Result<Vec<u8>, ArchiveError> {
    let files: Vec<&CompressedFile> = files.into_iter().collect();
    if files.is_empty() {
        return Err(ArchiveError::Empty);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.add_directory(format!("{ARCHIVE_NAME}/"), options)?;

    let mut names = UniqueNames::default();
    for file in files {
        let name = names.claim(&file.filename);
        writer.start_file(format!("{ARCHIVE_NAME}/{name}"), options)?;
        writer.write_all(&file.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// zip を `dir` に書き出し、そのパスを返す
pub async fn write_archive(dir: &Path, report: &BatchReport) -> Result<PathBuf, ArchiveError> {
    let data = build_archive(report.successes())?;
    let path = dir.join(archive_file_name());
    tokio::fs::write(&path, data).await?;

    tracing::info!(path = %path.display(), files = report.success_count(), "archive written");
    Ok(path)
}

/// 同名の出力を `name (1).ext` のように区別する
#[derive(Default)]
struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    fn claim(&mut self, filename: &str) -> String {
        if self.used.insert(filename.to_string()) {
            return filename.to_string();
        }

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (filename, String::new()),
        };
        let mut n = 1;
        loop {
            let candidate = format!("{stem} ({n}){ext}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
