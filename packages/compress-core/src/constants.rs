/// 幅指定がないときに長辺を収める上限（px）。サーバー側で設定により上書きできる
pub const DEFAULT_MAX_DIMENSION: u32 = 1920;

/// 幅として指定できる最大値（px）
pub const MAX_TARGET_WIDTH: u32 = 8192;

/// WebP / AVIF の 1 辺あたりの上限
pub const MAX_ENCODE_DIMENSION: u32 = 16383;

/// デコード・出力を許可する最大ピクセル数
pub const MAX_PIXELS: u64 = 100_000_000;

/// 品質の範囲とスライダーの刻み
pub const MIN_QUALITY: u8 = 5;
pub const MAX_QUALITY: u8 = 100;
pub const QUALITY_STEP: u8 = 5;

/// デフォルト品質
pub const DEFAULT_QUALITY: u8 = 75;

/// AVIF エンコード速度（1 = 最遅・高圧縮、10 = 最速）
pub const AVIF_ENCODE_SPEED: u8 = 6;

/// 受け付ける入力の Content-Type
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

/// まとめてダウンロードする zip のフォルダ名
pub const ARCHIVE_NAME: &str = "optimized_images";
