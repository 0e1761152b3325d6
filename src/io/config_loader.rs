use crate::io::render_settings::{ObjectSettings, RenderSettings};
use std::path::Path;
use toml::Value;

/// TOML配置管理器 - 统一处理所有配置的读写
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    /// 从TOML文件加载完整配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RenderSettings, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("读取配置文件失败: {}", e))?;

        Self::load_from_content(&content)
    }

    /// 从TOML内容字符串加载配置，缺失的键保留默认值
    pub fn load_from_content(content: &str) -> Result<RenderSettings, String> {
        let toml_value: Value =
            toml::from_str(content).map_err(|e| format!("解析TOML失败: {}", e))?;

        Self::parse_toml_to_settings(toml_value)
    }

    /// 保存配置到TOML文件
    pub fn save_to_file<P: AsRef<Path>>(settings: &RenderSettings, path: P) -> Result<(), String> {
        let toml_content = Self::settings_to_toml(settings);
        std::fs::write(path, toml_content).map_err(|e| format!("写入配置文件失败: {}", e))
    }

    /// 生成包含几个示例对象的配置文件
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), String> {
        let settings = Self::example_settings();
        Self::save_to_file(&settings, path).map_err(|e| format!("创建示例配置失败: {}", e))
    }

    /// 示例场景：三个对象，其中一个被镜像缩放，一个位于视野之外
    pub fn example_settings() -> RenderSettings {
        RenderSettings {
            frames: 12,
            background: "24,24,32,255".to_string(),
            save_depth: true,
            orbit_degrees_per_frame: 5.0,
            objects: vec![
                ObjectSettings {
                    mesh: "cube".to_string(),
                    position: "-1.2,0,0".to_string(),
                    rotation: "20,30,0".to_string(),
                    color: Some("230,90,60".to_string()),
                    spin: "0,10,0".to_string(),
                    ..Default::default()
                },
                ObjectSettings {
                    mesh: "octahedron".to_string(),
                    position: "1.2,0,0".to_string(),
                    scale: "-1.5,1.5,1.5".to_string(),
                    spin: "15,0,0".to_string(),
                    ..Default::default()
                },
                ObjectSettings {
                    mesh: "tetrahedron".to_string(),
                    position: "0,0,-150".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    // ===== TOML -> RenderSettings 转换 =====

    fn parse_toml_to_settings(toml: Value) -> Result<RenderSettings, String> {
        let mut settings = RenderSettings::default();

        // [render] 部分
        if let Some(render) = toml.get("render").and_then(|v| v.as_table()) {
            Self::parse_render_section(&mut settings, render)?;
        }

        // [output] 部分
        if let Some(output) = toml.get("output").and_then(|v| v.as_table()) {
            Self::parse_output_section(&mut settings, output)?;
        }

        // [camera] 部分
        if let Some(camera) = toml.get("camera").and_then(|v| v.as_table()) {
            Self::parse_camera_section(&mut settings, camera)?;
        }

        // [[object]] 数组；出现时整体替换默认对象
        if let Some(objects) = Self::parse_objects_array(&toml)? {
            settings.objects = objects;
        }

        Ok(settings)
    }

    // ===== 各个section的解析方法 =====

    fn parse_render_section(
        settings: &mut RenderSettings,
        render: &toml::Table,
    ) -> Result<(), String> {
        if let Some(width) = get_usize(render, "render", "width")? {
            settings.width = width;
        }
        if let Some(height) = get_usize(render, "render", "height")? {
            settings.height = height;
        }
        if let Some(frames) = get_usize(render, "render", "frames")? {
            settings.frames = frames;
        }
        if let Some(background) = get_str(render, "render", "background")? {
            settings.background = background;
        }
        if let Some(workers) = get_usize(render, "render", "workers")? {
            settings.workers = workers;
        }
        Ok(())
    }

    fn parse_output_section(
        settings: &mut RenderSettings,
        output: &toml::Table,
    ) -> Result<(), String> {
        if let Some(output_dir) = get_str(output, "output", "output_dir")? {
            settings.output_dir = output_dir;
        }
        if let Some(name) = get_str(output, "output", "output")? {
            settings.output = name;
        }
        if let Some(save_depth) = get_bool(output, "output", "save_depth")? {
            settings.save_depth = save_depth;
        }
        Ok(())
    }

    fn parse_camera_section(
        settings: &mut RenderSettings,
        camera: &toml::Table,
    ) -> Result<(), String> {
        if let Some(projection) = get_str(camera, "camera", "projection")? {
            settings.projection = projection;
        }
        if let Some(from) = get_str(camera, "camera", "from")? {
            settings.camera_from = from;
        }
        if let Some(at) = get_str(camera, "camera", "at")? {
            settings.camera_at = at;
        }
        if let Some(up) = get_str(camera, "camera", "up")? {
            settings.camera_up = up;
        }
        if let Some(fov) = get_f32(camera, "camera", "fov")? {
            settings.camera_fov = fov;
        }
        if let Some(ortho_height) = get_f32(camera, "camera", "ortho_height")? {
            settings.ortho_height = ortho_height;
        }
        if let Some(near) = get_f32(camera, "camera", "near")? {
            settings.near = near;
        }
        if let Some(far) = get_f32(camera, "camera", "far")? {
            settings.far = far;
        }
        if let Some(orbit) = get_f32(camera, "camera", "orbit_degrees_per_frame")? {
            settings.orbit_degrees_per_frame = orbit;
        }
        Ok(())
    }

    /// 对象解析 - 支持 [[object]] 数组语法
    fn parse_objects_array(toml: &Value) -> Result<Option<Vec<ObjectSettings>>, String> {
        let Some(value) = toml.get("object") else {
            return Ok(None);
        };
        let array = value
            .as_array()
            .ok_or("object 必须写成 [[object]] 数组")?;

        let mut objects = Vec::with_capacity(array.len());
        for (i, object_value) in array.iter().enumerate() {
            let table = object_value
                .as_table()
                .ok_or_else(|| format!("第{}个对象不是表", i + 1))?;
            let object = Self::parse_single_object(table)
                .map_err(|e| format!("第{}个对象解析失败: {}", i + 1, e))?;
            objects.push(object);
        }

        Ok(Some(objects))
    }

    fn parse_single_object(table: &toml::Table) -> Result<ObjectSettings, String> {
        let mut object = ObjectSettings::default();
        if let Some(mesh) = get_str(table, "object", "mesh")? {
            object.mesh = mesh;
        }
        if let Some(position) = get_str(table, "object", "position")? {
            object.position = position;
        }
        if let Some(rotation) = get_str(table, "object", "rotation")? {
            object.rotation = rotation;
        }
        if let Some(scale) = get_str(table, "object", "scale")? {
            object.scale = scale;
        }
        object.color = get_str(table, "object", "color")?;
        if let Some(spin) = get_str(table, "object", "spin_degrees_per_frame")? {
            object.spin = spin;
        }
        Ok(object)
    }

    // ===== RenderSettings -> TOML 转换 =====

    fn settings_to_toml(settings: &RenderSettings) -> String {
        let mut content = String::new();

        // 文件头注释
        content.push_str("# 软件光栅化渲染器配置文件\n\n");

        // [render] 部分
        content.push_str("[render]\n");
        content.push_str(&format!("width = {}\n", settings.width));
        content.push_str(&format!("height = {}\n", settings.height));
        content.push_str(&format!("frames = {}\n", settings.frames));
        content.push_str(&format!("background = \"{}\"\n", settings.background));
        content.push_str(&format!(
            "workers = {}  # 0 = 按CPU核数自动选择\n",
            settings.workers
        ));
        content.push('\n');

        // [output] 部分
        content.push_str("[output]\n");
        content.push_str(&format!("output_dir = \"{}\"\n", settings.output_dir));
        content.push_str(&format!("output = \"{}\"\n", settings.output));
        content.push_str(&format!("save_depth = {}\n", settings.save_depth));
        content.push('\n');

        // [camera] 部分
        content.push_str("[camera]\n");
        content.push_str(&format!(
            "projection = \"{}\"  # perspective | orthographic\n",
            settings.projection
        ));
        content.push_str(&format!("from = \"{}\"\n", settings.camera_from));
        content.push_str(&format!("at = \"{}\"\n", settings.camera_at));
        content.push_str(&format!("up = \"{}\"\n", settings.camera_up));
        content.push_str(&format!("fov = {:?}\n", settings.camera_fov));
        content.push_str(&format!("ortho_height = {:?}\n", settings.ortho_height));
        content.push_str(&format!("near = {:?}\n", settings.near));
        content.push_str(&format!("far = {:?}\n", settings.far));
        content.push_str(&format!(
            "orbit_degrees_per_frame = {:?}\n",
            settings.orbit_degrees_per_frame
        ));

        // [[object]] 数组
        for object in &settings.objects {
            content.push_str("\n[[object]]\n");
            content.push_str(&format!("mesh = \"{}\"\n", object.mesh));
            content.push_str(&format!("position = \"{}\"\n", object.position));
            content.push_str(&format!("rotation = \"{}\"\n", object.rotation));
            content.push_str(&format!("scale = \"{}\"\n", object.scale));
            if let Some(color) = &object.color {
                content.push_str(&format!("color = \"{}\"\n", color));
            } else {
                content.push_str("# color = \"r,g,b\"  # 缺省时使用随机颜色\n");
            }
            content.push_str(&format!("spin_degrees_per_frame = \"{}\"\n", object.spin));
        }

        content
    }
}

// ===== 带类型检查的取值，类型错误时报出键名 =====

fn get_str(table: &toml::Table, section: &str, key: &str) -> Result<Option<String>, String> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_error(section, key, "字符串", other)),
    }
}

fn get_bool(table: &toml::Table, section: &str, key: &str) -> Result<Option<bool>, String> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(other) => Err(type_error(section, key, "布尔值", other)),
    }
}

fn get_usize(table: &toml::Table, section: &str, key: &str) -> Result<Option<usize>, String> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(i)) => usize::try_from(*i)
            .map(Some)
            .map_err(|_| format!("[{}] {} 不能为负数: {}", section, key, i)),
        Some(other) => Err(type_error(section, key, "非负整数", other)),
    }
}

/// 浮点字段同时接受整数写法
fn get_f32(table: &toml::Table, section: &str, key: &str) -> Result<Option<f32>, String> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Float(f)) => Ok(Some(*f as f32)),
        Some(Value::Integer(i)) => Ok(Some(*i as f32)),
        Some(other) => Err(type_error(section, key, "数字", other)),
    }
}

fn type_error(section: &str, key: &str, expected: &str, found: &Value) -> String {
    format!(
        "[{}] {} 应为{}，实际为 {}",
        section,
        key,
        expected,
        found.type_str()
    )
}
