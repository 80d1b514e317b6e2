//! 滑块拖动轨迹
//!
//! 步长按平方曲线递减：先快后慢，接近人手拖动。

/// 轨迹点数（包含起点）
const TRACK_POINTS: usize = 33;

/// 把 `distance` 拆成若干步长，步长之和等于 `distance`
pub fn build_tracks(distance: f64) -> Vec<f64> {
    // 第 i 步权重为 i^2 - (i-1)^2，倒序后即先大后小
    let mut weights: Vec<f64> = (1..TRACK_POINTS)
        .map(|i| {
            let i = i as f64;
            i * i - (i - 1.0) * (i - 1.0)
        })
        .collect();
    weights.reverse();

    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| distance * w / total).collect()
}
