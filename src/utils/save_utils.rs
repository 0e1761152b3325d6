use crate::core::renderer::FrameView;
use crate::utils::image_utils::{color_buffer_to_rgba, depth_buffer_to_gray, save_image};
use image::ColorType;
use log::info;
use std::path::{Path, PathBuf};

/// 保存一帧的渲染结果（彩色图像和可选的深度图）
///
/// 彩色图为 `<output_name>_color.png`，深度图为 `<output_name>_depth.png`。
/// 返回写入的文件路径。
pub fn save_frame(
    frame: &FrameView<'_>,
    output_dir: &str,
    output_name: &str,
    save_depth: bool,
) -> Result<Vec<PathBuf>, String> {
    let (width, height) = (frame.width as u32, frame.height as u32);
    let mut written = Vec::with_capacity(2);

    let color_path = output_path(output_dir, output_name, "color")?;
    save_image(
        &color_path,
        &color_buffer_to_rgba(frame.color),
        width,
        height,
        ColorType::Rgba8,
    )?;
    info!("图像已保存到 {}", color_path);
    written.push(PathBuf::from(color_path));

    if save_depth {
        let depth_path = output_path(output_dir, output_name, "depth")?;
        save_image(
            &depth_path,
            &depth_buffer_to_gray(frame.depth),
            width,
            height,
            ColorType::L8,
        )?;
        info!("深度图已保存到 {}", depth_path);
        written.push(PathBuf::from(depth_path));
    }

    Ok(written)
}

fn output_path(output_dir: &str, output_name: &str, suffix: &str) -> Result<String, String> {
    Path::new(output_dir)
        .join(format!("{}_{}.png", output_name, suffix))
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| format!("创建{}输出路径字符串失败", suffix))
}
