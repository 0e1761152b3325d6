use crate::core::frame_buffer::Color32;
use crate::core::renderer::Renderable;
use crate::geometry::transform::TransformFactory;
use crate::scene::mesh::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};
use std::sync::Arc;

/// 可变换对象特性，定义了位置、旋转、缩放的标准接口和便捷方法
pub trait Transformable {
    fn position(&self) -> Vector3<f32>;

    fn set_position(&mut self, position: Vector3<f32>);

    /// 欧拉角（度）
    fn rotation_degrees(&self) -> Vector3<f32>;

    fn set_rotation_degrees(&mut self, rotation: Vector3<f32>);

    fn set_scale(&mut self, scale: Vector3<f32>);

    /// 在全局坐标系中平移对象
    fn translate(&mut self, delta: &Vector3<f32>) {
        let position = self.position() + delta;
        self.set_position(position);
    }

    /// 在当前欧拉角上累加旋转，结果规约到 [0, 360)
    fn rotate_degrees(&mut self, delta: &Vector3<f32>) {
        let rotation = (self.rotation_degrees() + delta).map(|angle| angle.rem_euclid(360.0));
        self.set_rotation_degrees(rotation);
    }

    /// 均匀缩放
    fn set_uniform_scale(&mut self, factor: f32) {
        self.set_scale(Vector3::new(factor, factor, factor));
    }
}

/// 场景中的一个对象：共享网格 + 变换 + 纯色
///
/// 模型矩阵和包围球半径在变换改变时立即重算，渲染时只读取缓存值。
#[derive(Debug, Clone)]
pub struct SceneObject {
    mesh: Arc<Mesh>,
    position: Vector3<f32>,
    rotation: Vector3<f32>,
    scale: Vector3<f32>,
    pub color: Color32,
    /// 每帧绕三个轴的自转角度（度）
    pub spin_degrees_per_frame: Vector3<f32>,
    model_matrix: Matrix4<f32>,
    bounding_radius: f32,
}

impl SceneObject {
    /// 创建一个位于原点、无旋转、单位缩放的对象
    pub fn new(mesh: Arc<Mesh>, color: Color32) -> Self {
        let mut object = Self {
            mesh,
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            color,
            spin_degrees_per_frame: Vector3::zeros(),
            model_matrix: Matrix4::identity(),
            bounding_radius: 0.0,
        };
        object.update_transform();
        object
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_rotation_degrees(mut self, rotation: Vector3<f32>) -> Self {
        self.set_rotation_degrees(rotation);
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn with_spin(mut self, spin_degrees_per_frame: Vector3<f32>) -> Self {
        self.spin_degrees_per_frame = spin_degrees_per_frame;
        self
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// 按自转速度推进一帧
    pub fn advance_spin(&mut self) {
        if self.spin_degrees_per_frame != Vector3::zeros() {
            let spin = self.spin_degrees_per_frame;
            self.rotate_degrees(&spin);
        }
    }

    /// 局部原点在世界空间中的位置
    pub fn origin(&self) -> Point3<f32> {
        Point3::from(self.position)
    }

    fn update_transform(&mut self) {
        let rotation = TransformFactory::rotation_euler_degrees(&self.rotation);
        self.model_matrix = TransformFactory::trs(&self.position, &rotation, &self.scale);
        self.bounding_radius = self.mesh.bounding_radius() * self.scale.abs().max();
    }
}

impl Transformable for SceneObject {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.update_transform();
    }

    fn rotation_degrees(&self) -> Vector3<f32> {
        self.rotation
    }

    fn set_rotation_degrees(&mut self, rotation: Vector3<f32>) {
        self.rotation = rotation;
        self.update_transform();
    }

    fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.update_transform();
    }
}

impl Renderable for SceneObject {
    fn model_matrix(&self) -> Matrix4<f32> {
        self.model_matrix
    }

    fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    fn color(&self) -> Color32 {
        self.color
    }

    fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    fn vertices(&self) -> &[Point3<f32>] {
        self.mesh.vertices()
    }

    fn triangles(&self) -> &[[u32; 3]] {
        self.mesh.triangles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_follows_largest_scale_axis() {
        let mut object = SceneObject::new(Arc::new(Mesh::octahedron()), Color32::WHITE);
        assert!((object.bounding_radius() - 0.5).abs() < 1e-6);

        object.set_scale(Vector3::new(1.0, -4.0, 2.0));
        assert!((object.bounding_radius() - 2.0).abs() < 1e-6);

        object.set_uniform_scale(0.5);
        assert!((object.bounding_radius() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn model_matrix_translation_is_origin() {
        let mut object = SceneObject::new(Arc::new(Mesh::cube()), Color32::WHITE)
            .with_rotation_degrees(Vector3::new(30.0, 45.0, 0.0))
            .with_position(Vector3::new(1.0, 2.0, 3.0));
        object.translate(&Vector3::new(0.0, 0.0, -1.0));

        let m = object.model_matrix();
        assert_eq!(Point3::new(m.m14, m.m24, m.m34), Point3::new(1.0, 2.0, 2.0));
        assert_eq!(object.origin(), Point3::new(1.0, 2.0, 2.0));
    }

    #[test]
    fn spin_wraps_angles() {
        let mut object = SceneObject::new(Arc::new(Mesh::cube()), Color32::WHITE)
            .with_rotation_degrees(Vector3::new(0.0, 350.0, 0.0))
            .with_spin(Vector3::new(0.0, 20.0, 0.0));
        object.advance_spin();
        assert!((object.rotation_degrees().y - 10.0).abs() < 1e-4);
    }
}
