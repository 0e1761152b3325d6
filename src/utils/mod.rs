// utils/mod.rs
// 导出颜色、图像转换与保存相关模块
pub mod color_utils;
pub mod image_utils;
pub mod save_utils;
