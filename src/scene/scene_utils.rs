use crate::geometry::camera::{Camera, Projection};
use crate::io::render_settings::{
    ObjectSettings, RenderSettings, parse_color, parse_point3, parse_vec3,
};
use crate::scene::mesh::Mesh;
use crate::scene::scene_object::SceneObject;
use crate::utils::color_utils::random_object_color;
use log::debug;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// 表示一个 3D 场景：相机和按提交顺序排列的对象
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub objects: Vec<SceneObject>,
    /// 每帧相机绕目标点（Y 轴）旋转的角度
    pub orbit_degrees_per_frame: f32,
    frame_index: usize,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            objects: Vec::new(),
            orbit_degrees_per_frame: 0.0,
            frame_index: 0,
        }
    }

    /// 从渲染设置创建完整场景
    ///
    /// 同名网格只构建一次，由各对象共享。
    pub fn from_settings(settings: &RenderSettings) -> Result<Self, String> {
        let camera = Self::setup_camera_from_settings(settings)?;
        let mut scene = Self::new(camera);
        scene.orbit_degrees_per_frame = settings.orbit_degrees_per_frame;

        let mut meshes: HashMap<&str, Arc<Mesh>> = HashMap::new();
        for (index, object_settings) in settings.objects.iter().enumerate() {
            let mesh = match meshes.entry(object_settings.mesh.as_str()) {
                Entry::Occupied(entry) => entry.get().clone(),
                Entry::Vacant(entry) => entry
                    .insert(Arc::new(Mesh::builtin(&object_settings.mesh)?))
                    .clone(),
            };
            let object = Self::build_object(index, object_settings, mesh)
                .map_err(|e| format!("第{}个对象配置错误: {}", index + 1, e))?;
            scene.add_object(object);
        }

        debug!(
            "场景包含 {} 个对象，{} 种网格",
            scene.objects.len(),
            meshes.len()
        );
        Ok(scene)
    }

    /// 根据渲染设置创建相机
    pub fn setup_camera_from_settings(settings: &RenderSettings) -> Result<Camera, String> {
        let camera_from = parse_point3(&settings.camera_from)
            .map_err(|e| format!("无效的相机位置格式: {}", e))?;
        let camera_at =
            parse_point3(&settings.camera_at).map_err(|e| format!("无效的相机目标格式: {}", e))?;
        let camera_up =
            parse_vec3(&settings.camera_up).map_err(|e| format!("无效的相机上方向格式: {}", e))?;

        let projection = match settings.projection.as_str() {
            "perspective" => Projection::Perspective {
                fov_y_degrees: settings.camera_fov,
            },
            "orthographic" => Projection::Orthographic {
                view_height: settings.ortho_height,
            },
            _ => return Err(format!("不支持的投影类型: {}", settings.projection)),
        };

        Ok(Camera::new(
            camera_from,
            camera_at,
            camera_up,
            projection,
            settings.width,
            settings.height,
            settings.near,
            settings.far,
        ))
    }

    fn build_object(
        index: usize,
        settings: &ObjectSettings,
        mesh: Arc<Mesh>,
    ) -> Result<SceneObject, String> {
        let position = parse_vec3(&settings.position).map_err(|e| format!("position: {}", e))?;
        let rotation = parse_vec3(&settings.rotation).map_err(|e| format!("rotation: {}", e))?;
        let scale = parse_vec3(&settings.scale).map_err(|e| format!("scale: {}", e))?;
        let spin = parse_vec3(&settings.spin).map_err(|e| format!("spin: {}", e))?;
        let color = match &settings.color {
            Some(color) => parse_color(color).map_err(|e| format!("color: {}", e))?,
            None => random_object_color(index),
        };

        Ok(SceneObject::new(mesh, color)
            .with_position(position)
            .with_rotation_degrees(rotation)
            .with_scale(scale)
            .with_spin(spin))
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// 已推进的帧数
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// 推进一帧：对象自转，相机环绕
    pub fn advance_frame(&mut self) {
        for object in &mut self.objects {
            object.advance_spin();
        }
        if self.orbit_degrees_per_frame != 0.0 {
            self.camera.orbit_y(self.orbit_degrees_per_frame);
        }
        self.frame_index += 1;
    }

    /// 获取场景统计信息
    pub fn get_scene_stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            object_count: self.objects.len(),
            ..Default::default()
        };
        for object in &self.objects {
            stats.vertex_count += object.mesh().vertex_count();
            stats.triangle_count += object.mesh().triangle_count();
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub object_count: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
}
