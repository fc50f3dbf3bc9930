use crate::batch::{BatchReport, FileReport, Outcome};
use crate::selection::{ProbeStatus, UploadItem};

/// 入力に対する削減率（%）。出力の方が大きければ負になる
pub fn savings_percent(input_size: u64, output_size: u64) -> f64 {
    if input_size == 0 {
        return 0.0;
    }
    100.0 - (output_size as f64 / input_size as f64 * 100.0)
}

/// 10 進単位でサイズを表示する（1000 KB 以上は MB）
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1000.0;
    if kb >= 1000.0 {
        format!("{:.2} MB", bytes as f64 / 1_000_000.0)
    } else {
        format!("{kb:.2} KB")
    }
}

/// 個別ダウンロードのラベル
pub fn download_label(success_count: usize) -> &'static str {
    if success_count == 1 {
        "Download"
    } else {
        "Download Single"
    }
}

/// ドロップ領域の 1 行
pub fn preview_row(item: &UploadItem) -> String {
    let size = format_size(item.file.size());
    match &item.status {
        ProbeStatus::Ready { width, height } => {
            format!("{}  {width} x {height}  {size}", item.name())
        }
        ProbeStatus::Failed { reason } => {
            format!("{}  unreadable ({reason})  {size}", item.name())
        }
    }
}

/// 結果一覧の 1 行
pub fn result_row(file: &FileReport, success_count: usize) -> String {
    match &file.outcome {
        Outcome::Success(compressed) => {
            let (stem, ext) = compressed
                .filename
                .rsplit_once('.')
                .unwrap_or((compressed.filename.as_str(), ""));
            format!(
                "{stem}  .{ext}  {}  Saved {:.1}%  [{}]",
                format_size(compressed.size()),
                compressed.saved_percent,
                download_label(success_count)
            )
        }
        Outcome::Failure { reason } => format!("{}  Failed: {reason}", file.name),
    }
}

/// 結果一覧全体
pub fn render_report(report: &BatchReport) -> Vec<String> {
    let successes = report.success_count();
    report
        .files
        .iter()
        .map(|file| result_row(file, successes))
        .collect()
}
