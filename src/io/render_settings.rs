use crate::core::frame_buffer::Color32;
use log::warn;
use nalgebra::{Point3, Vector3};

/// 单个 `[[object]]` 条目，向量字段保存为 "x,y,z" 字符串
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSettings {
    /// 内置网格名称
    pub mesh: String,
    pub position: String,
    /// 欧拉角（度）
    pub rotation: String,
    pub scale: String,
    /// "r,g,b" 或 "r,g,b,a"，缺省时按对象序号生成随机颜色
    pub color: Option<String>,
    /// 每帧自转角度（度）
    pub spin: String,
}

impl Default for ObjectSettings {
    fn default() -> Self {
        Self {
            mesh: "cube".to_string(),
            position: "0,0,0".to_string(),
            rotation: "0,0,0".to_string(),
            scale: "1,1,1".to_string(),
            color: None,
            spin: "0,0,0".to_string(),
        }
    }
}

/// 所有可通过TOML配置的渲染参数
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    // ===== 渲染基础设置 =====
    /// 输出图像的宽度
    pub width: usize,
    /// 输出图像的高度
    pub height: usize,
    /// 渲染帧数
    pub frames: usize,
    /// 背景色 "r,g,b[,a]"
    pub background: String,
    /// 后台清除线程数，0 表示按CPU核数自动选择
    pub workers: usize,

    // ===== 输出设置 =====
    /// 输出图像的目录
    pub output_dir: String,
    /// 输出文件的基础名称
    pub output: String,
    /// 是否同时保存深度图
    pub save_depth: bool,

    // ===== 相机设置 =====
    /// 投影类型："perspective"或"orthographic"
    pub projection: String,
    pub camera_from: String,
    pub camera_at: String,
    pub camera_up: String,
    /// 透视投影的垂直视场角（度）
    pub camera_fov: f32,
    /// 正交投影视体的高度
    pub ortho_height: f32,
    pub near: f32,
    pub far: f32,
    /// 每帧相机环绕角度（度）
    pub orbit_degrees_per_frame: f32,

    // ===== 场景对象 =====
    pub objects: Vec<ObjectSettings>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            frames: 1,
            background: "0,0,0,0".to_string(),
            workers: 0,

            output_dir: "output".to_string(),
            output: "frame".to_string(),
            save_depth: false,

            projection: "perspective".to_string(),
            camera_from: "0,1.5,4".to_string(),
            camera_at: "0,0,0".to_string(),
            camera_up: "0,1,0".to_string(),
            camera_fov: 45.0,
            ortho_height: 4.0,
            near: 0.1,
            far: 100.0,
            orbit_degrees_per_frame: 0.0,

            objects: vec![ObjectSettings::default()],
        }
    }
}

impl RenderSettings {
    /// 解析背景色
    pub fn background_color(&self) -> Result<Color32, String> {
        parse_color(&self.background)
    }

    /// 第 `frame` 帧输出文件的基础名称（不含后缀）
    pub fn frame_output_name(&self, frame: usize) -> String {
        if self.frames <= 1 {
            self.output.clone()
        } else {
            format!("{}_{:04}", self.output, frame)
        }
    }

    /// 验证渲染参数
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("错误: 图像宽度和高度必须大于0".to_string());
        }

        if self.frames == 0 {
            return Err("错误: 帧数必须大于0".to_string());
        }

        if self.output_dir.trim().is_empty() {
            return Err("错误: 输出目录不能为空".to_string());
        }

        if self.output.trim().is_empty() {
            return Err("错误: 输出文件名不能为空".to_string());
        }

        parse_color(&self.background).map_err(|e| format!("错误: 背景色格式不正确: {}", e))?;

        // 验证相机参数
        if parse_vec3(&self.camera_from).is_err() {
            return Err("错误: 相机位置格式不正确，应为 x,y,z 格式".to_string());
        }
        if parse_vec3(&self.camera_at).is_err() {
            return Err("错误: 相机目标格式不正确，应为 x,y,z 格式".to_string());
        }
        if parse_vec3(&self.camera_up).is_err() {
            return Err("错误: 相机上方向格式不正确，应为 x,y,z 格式".to_string());
        }

        match self.projection.as_str() {
            "perspective" => {
                if !(self.camera_fov > 0.0 && self.camera_fov < 180.0) {
                    return Err(format!(
                        "错误: 视场角必须在 (0, 180) 之间，当前为 {}",
                        self.camera_fov
                    ));
                }
            }
            "orthographic" => {
                if self.ortho_height <= 0.0 {
                    return Err("错误: 正交视体高度必须大于0".to_string());
                }
            }
            other => return Err(format!("错误: 不支持的投影类型 '{}'", other)),
        }

        if !(self.near > 0.0 && self.far > self.near) {
            return Err(format!(
                "错误: 裁剪平面需满足 0 < near < far，当前 near={} far={}",
                self.near, self.far
            ));
        }

        if self.objects.is_empty() {
            warn!("场景中没有对象，输出将只有背景");
        }

        Ok(())
    }
}

pub fn parse_vec3(s: &str) -> Result<Vector3<f32>, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("需要3个逗号分隔的值，得到 '{}'", s));
    }
    let mut values = [0.0f32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("无效数字 '{}': {}", part, e))?;
    }
    Ok(Vector3::from(values))
}

pub fn parse_point3(s: &str) -> Result<Point3<f32>, String> {
    parse_vec3(s).map(Point3::from)
}

/// 解析 "r,g,b" 或 "r,g,b,a"（0-255），缺省 alpha 为 255
pub fn parse_color(s: &str) -> Result<Color32, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("需要3或4个逗号分隔的0-255整数，得到 '{}'", s));
    }
    let mut channels = [255u8; 4];
    for (channel, part) in channels.iter_mut().zip(&parts) {
        *channel = part
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("无效颜色分量 '{}': {}", part, e))?;
    }
    Ok(Color32::from(channels))
}
