use std::path::Path;

use crate::transform::OutputFormat;

const MAX_FILENAME_LEN: usize = 255;
const FALLBACK_STEM: &str = "image";

/// アップロードされたファイル名からディレクトリ部分と制御文字を取り除く
///
/// ブラウザによってはフルパスが送られてくるため、最後の区切り以降だけを使う。
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return FALLBACK_STEM.to_string();
    }

    cleaned.chars().take(MAX_FILENAME_LEN).collect()
}

/// 出力ファイル名 `<stem>.<ext>` を求める
pub fn derive_output_filename(original: &str, format: OutputFormat) -> String {
    let name = sanitize_filename(original);
    let stem = Path::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM);

    format!("{stem}.{}", format.extension())
}
