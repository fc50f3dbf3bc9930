/// 倍率を適用して新しい寸法を計算する
fn apply_scale(src_w: u32, src_h: u32, scale: f64) -> (u32, u32) {
    let new_w = (src_w as f64 * scale).round() as u32;
    let new_h = (src_h as f64 * scale).round() as u32;

    // 最小1pxを保証
    (new_w.max(1), new_h.max(1))
}

/// 幅を指定どおりにし、高さはアスペクト比から求める
///
/// 指定幅が元画像より大きい場合も拡大する。
pub fn calculate_width_dimensions(src_w: u32, src_h: u32, target_w: u32) -> (u32, u32) {
    if src_w == 0 || target_w == 0 {
        return (target_w.max(1), src_h.max(1));
    }
    let scale = target_w as f64 / src_w as f64;
    let (_, h) = apply_scale(src_w, src_h, scale);
    (target_w, h)
}

/// 長辺を `max_dimension` 以内に収める（拡大はしない）
pub fn calculate_capped_dimensions(src_w: u32, src_h: u32, max_dimension: u32) -> (u32, u32) {
    let long_edge = src_w.max(src_h);
    if long_edge <= max_dimension || long_edge == 0 {
        return (src_w, src_h);
    }
    let scale = max_dimension as f64 / long_edge as f64;
    apply_scale(src_w, src_h, scale)
}

/// 出力寸法を決める
///
/// 幅指定があればそれを優先し、なければ上限で抑える。
pub fn calculate_target_dimensions(
    src_w: u32,
    src_h: u32,
    width: Option<u32>,
    max_dimension: u32,
) -> (u32, u32) {
    match width {
        Some(w) => calculate_width_dimensions(src_w, src_h, w),
        None => calculate_capped_dimensions(src_w, src_h, max_dimension),
    }
}
