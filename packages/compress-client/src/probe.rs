use compress_core::probe_dimensions;
use tokio::sync::mpsc;

use crate::selection::{ProbeStatus, SelectedFile, UploadItem};

/// 1 ファイルの寸法を読む
///
/// ヘッダー解析用のリーダーはこの関数の中で生成・破棄されるため、
/// 失敗時も含めて呼び出し後に残るリソースはない。
pub fn probe_file(file: SelectedFile) -> UploadItem {
    let status = match probe_dimensions(&file.bytes) {
        Ok((width, height)) => ProbeStatus::Ready { width, height },
        Err(e) => {
            tracing::warn!(file = %file.name, error = %e, "failed to read image dimensions");
            ProbeStatus::Failed {
                reason: e.to_string(),
            }
        }
    };

    UploadItem { file, status }
}

/// 全ファイルを並行に調べ、完了順に結果を流す
///
/// 全件送り終えるとチャネルが閉じる。
pub fn spawn_probes(files: Vec<SelectedFile>) -> mpsc::UnboundedReceiver<UploadItem> {
    let (tx, rx) = mpsc::unbounded_channel();

    for file in files {
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            // 受信側が先に破棄された場合は結果を捨てる
            let _ = tx.send(probe_file(file));
        });
    }

    rx
}
