use crate::core::frame_buffer::Color32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 按对象序号生成确定性的伪随机颜色（不透明）
///
/// 分量限制在 [64, 255]，避免接近黑色的背景色。
pub fn random_object_color(index: usize) -> Color32 {
    let mut rng = StdRng::seed_from_u64(index as u64);
    Color32::rgb(
        rng.random_range(64..=255),
        rng.random_range(64..=255),
        rng.random_range(64..=255),
    )
}

/// 把线性深度值映射为 8 位灰度，远平面为白色
///
/// NDC 深度 [-1, 1] 线性映射到 [0, 255]，NaN 视为最远。
#[inline]
pub fn depth_to_gray(depth: f32) -> u8 {
    if depth.is_nan() {
        return 255;
    }
    (((depth + 1.0) * 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}
