use std::path::Path;

use bytes::Bytes;
use compress_core::ACCEPTED_CONTENT_TYPES;

use crate::error::SelectionError;
use crate::probe;

/// ユーザーが選択したファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// ディスク上のファイルを読み込む。Content-Type は拡張子から決める
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type_for(&name);

        Ok(Self::new(name, content_type, Bytes::from(bytes)))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_accepted(&self) -> bool {
        ACCEPTED_CONTENT_TYPES.contains(&self.content_type.to_ascii_lowercase().as_str())
    }
}

/// 拡張子から Content-Type を推定する
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// 寸法の読み取り結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Ready { width: u32, height: u32 },
    Failed { reason: String },
}

/// プレビュー一覧の 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub file: SelectedFile,
    pub status: ProbeStatus,
}

impl UploadItem {
    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self.status {
            ProbeStatus::Ready { width, height } => Some((width, height)),
            ProbeStatus::Failed { .. } => None,
        }
    }
}

/// ドロップ領域の状態
///
/// `files` が送信対象、`items` が寸法付きのプレビュー一覧。
#[derive(Debug, Default)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
    items: Vec<UploadItem>,
    error: Option<String>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しく選択されたファイルで置き換える（以前の一覧はマージせず破棄）
    ///
    /// png / jpg / jpeg 以外は一覧に入れずエラーにする。受理されたファイルは
    /// エラーがあっても選択状態になる。
    pub fn select(&mut self, files: Vec<SelectedFile>) -> Result<(), SelectionError> {
        self.items.clear();
        let (accepted, rejected): (Vec<_>, Vec<_>) =
            files.into_iter().partition(SelectedFile::is_accepted);
        self.files = accepted;

        if rejected.is_empty() {
            self.error = None;
            return Ok(());
        }

        let names: Vec<String> = rejected.into_iter().map(|f| f.name).collect();
        tracing::warn!(rejected = ?names, "rejected files with unsupported type");
        let err = SelectionError::Rejected { names };
        self.error = Some(err.to_string());
        Err(err)
    }

    /// 全ファイルの寸法を読み取り、完了した順に一覧へ追加する
    pub async fn probe(&mut self) {
        self.probe_with(|_| {}).await;
    }

    /// `probe` と同じだが、1 件追加されるたびに `on_ready` を呼ぶ
    pub async fn probe_with(&mut self, mut on_ready: impl FnMut(&UploadItem)) {
        self.items.clear();
        let mut ready = probe::spawn_probes(self.files.clone());
        while let Some(item) = ready.recv().await {
            on_ready(&item);
            self.items.push(item);
        }
    }

    /// ファイル名が一致する行を一覧と選択の両方から取り除く
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.files.len() + self.items.len();
        self.items.retain(|item| item.name() != name);
        self.files.retain(|file| file.name != name);
        before != self.files.len() + self.items.len()
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn png(name: &str, width: u32, height: u32) -> SelectedFile {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        SelectedFile::new(name, "image/png", Bytes::from(buf.into_inner()))
    }

    fn text(name: &str) -> SelectedFile {
        SelectedFile::new(name, "text/plain", Bytes::from_static(b"hello"))
    }

    fn names(selection: &FileSelection) -> Vec<&str> {
        selection.files().iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.txt"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_accepted_types() {
        assert!(SelectedFile::new("a", "image/png", Bytes::new()).is_accepted());
        assert!(SelectedFile::new("a", "image/jpg", Bytes::new()).is_accepted());
        assert!(SelectedFile::new("a", "IMAGE/JPEG", Bytes::new()).is_accepted());
        assert!(!SelectedFile::new("a", "image/gif", Bytes::new()).is_accepted());
        assert!(!SelectedFile::new("a", "image/webp", Bytes::new()).is_accepted());
    }

    #[test]
    fn test_select_rejects_invalid_types() {
        let mut selection = FileSelection::new();
        let result = selection.select(vec![png("a.png", 4, 4), text("notes.txt")]);

        match result {
            Err(SelectionError::Rejected { names }) => assert_eq!(names, vec!["notes.txt"]),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(selection.error(), Some("Please select a valid file"));
        // 拒否されたファイルは一覧に入らない
        assert_eq!(names(&selection), vec!["a.png"]);
    }

    #[test]
    fn test_select_clears_error_and_previous_list() {
        let mut selection = FileSelection::new();
        let _ = selection.select(vec![text("x.txt")]);
        assert!(selection.error().is_some());

        selection.select(vec![png("a.png", 2, 2)]).unwrap();
        assert_eq!(selection.error(), None);

        selection.select(vec![png("b.png", 2, 2)]).unwrap();
        assert_eq!(names(&selection), vec!["b.png"]);
    }

    #[tokio::test]
    async fn test_probe_reads_dimensions() {
        let mut selection = FileSelection::new();
        selection
            .select(vec![png("wide.png", 40, 10), png("tall.png", 10, 30)])
            .unwrap();
        selection.probe().await;

        assert_eq!(selection.items().len(), 2);
        let wide = selection.items().iter().find(|i| i.name() == "wide.png").unwrap();
        assert_eq!(wide.dimensions(), Some((40, 10)));
        let tall = selection.items().iter().find(|i| i.name() == "tall.png").unwrap();
        assert_eq!(tall.dimensions(), Some((10, 30)));
    }

    #[tokio::test]
    async fn test_probe_flags_unreadable_file() {
        let mut selection = FileSelection::new();
        let broken = SelectedFile::new("broken.png", "image/png", Bytes::from_static(b"nope"));
        selection.select(vec![broken, png("ok.png", 3, 3)]).unwrap();

        let mut seen = Vec::new();
        selection
            .probe_with(|item| seen.push(item.name().to_string()))
            .await;

        assert_eq!(seen.len(), 2);
        let broken = selection.items().iter().find(|i| i.name() == "broken.png").unwrap();
        assert!(matches!(broken.status, ProbeStatus::Failed { .. }));
        assert_eq!(broken.dimensions(), None);
    }

    #[tokio::test]
    async fn test_remove_by_name_is_order_stable() {
        let mut selection = FileSelection::new();
        selection
            .select(vec![png("a.png", 1, 1), png("b.png", 1, 1), png("c.png", 1, 1)])
            .unwrap();
        selection.probe().await;

        assert!(selection.remove("b.png"));
        assert_eq!(names(&selection), vec!["a.png", "c.png"]);
        assert_eq!(selection.items().len(), 2);
        assert!(selection.items().iter().all(|i| i.name() != "b.png"));

        assert!(!selection.remove("missing.png"));
        assert_eq!(names(&selection), vec!["a.png", "c.png"]);
    }
}
