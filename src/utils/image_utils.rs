use crate::core::frame_buffer::Color32;
use crate::utils::color_utils::depth_to_gray;
use image::ColorType;
use rayon::prelude::*;

/// 颜色缓冲区转为紧密排列的 RGBA8 字节
pub fn color_buffer_to_rgba(color: &[Color32]) -> Vec<u8> {
    color.par_iter().flat_map_iter(|c| c.to_array()).collect()
}

/// 深度缓冲区转为 8 位灰度字节
pub fn depth_buffer_to_gray(depth: &[f32]) -> Vec<u8> {
    depth.par_iter().map(|&d| depth_to_gray(d)).collect()
}

/// 保存图像数据到PNG文件
pub fn save_image(
    path: &str,
    data: &[u8],
    width: u32,
    height: u32,
    color_type: ColorType,
) -> Result<(), String> {
    image::save_buffer(path, data, width, height, color_type)
        .map_err(|e| format!("保存图像到 {} 时出错: {}", path, e))
}
