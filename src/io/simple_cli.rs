use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::RenderSettings;
use clap::Parser;
use log::info;

/// 命令行参数 - 配置文件为主，少量覆盖项
#[derive(Parser, Debug)]
#[command(name = "soft-rasterizer")]
#[command(about = "TOML驱动的纯色三角形软件光栅化渲染器")]
pub struct SimpleCli {
    /// 配置文件路径（TOML格式）
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// 使用示例配置（写入临时文件并加载）
    #[arg(long)]
    pub use_example_config: bool,

    /// 覆盖渲染帧数
    #[arg(short, long)]
    pub frames: Option<usize>,

    /// 覆盖输出目录
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<String>,
}

impl SimpleCli {
    /// 解析命令行并返回最终的渲染设置
    pub fn process() -> Result<RenderSettings, String> {
        Self::parse().into_settings()
    }

    pub fn into_settings(self) -> Result<RenderSettings, String> {
        let mut settings = if self.use_example_config {
            let temp_config_path = "temp_example_config.toml";

            TomlConfigLoader::create_example_config(temp_config_path)
                .map_err(|e| format!("创建示例配置失败: {}", e))?;
            info!("已创建示例配置: {}", temp_config_path);

            // 文件保留下来，用户可以当模板
            TomlConfigLoader::load_from_file(temp_config_path)
                .map_err(|e| format!("加载示例配置失败: {}", e))?
        } else if let Some(config_path) = &self.config {
            info!("加载配置文件: {}", config_path);
            TomlConfigLoader::load_from_file(config_path)
                .map_err(|e| format!("配置文件加载失败: {}", e))?
        } else {
            info!("使用默认设置");
            RenderSettings::default()
        };

        if let Some(frames) = self.frames {
            settings.frames = frames;
        }
        if let Some(output_dir) = self.output_dir {
            settings.output_dir = output_dir;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = SimpleCli::parse_from(["soft-rasterizer", "--frames", "3", "-o", "renders"]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.frames, 3);
        assert_eq!(settings.output_dir, "renders");
        assert_eq!(settings.width, RenderSettings::default().width);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = SimpleCli::parse_from(["soft-rasterizer", "--config", "/nonexistent/scene.toml"]);
        assert!(cli.into_settings().is_err());
    }
}
