use crate::geometry::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

/// 投影方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// 垂直视场角（度）
    Perspective { fov_y_degrees: f32 },
    /// 正交视体在世界空间中的高度，宽度由宽高比决定
    Orthographic { view_height: f32 },
}

/// 相机类，负责管理视角、投影变换和输出分辨率
#[derive(Debug, Clone)]
pub struct Camera {
    /// 相机位置（眼睛位置）
    pub position: Point3<f32>,
    /// 相机观察点（目标位置）
    pub target: Point3<f32>,
    /// 相机上方向
    pub up: Vector3<f32>,
    pub projection: Projection,
    /// 近裁剪平面距离
    pub near: f32,
    /// 远裁剪平面距离
    pub far: f32,
    width: usize,
    height: usize,
    /// 视图矩阵（世界坐标 -> 相机坐标）
    view_matrix: Matrix4<f32>,
    /// 投影矩阵（相机坐标 -> 裁剪坐标）
    projection_matrix: Matrix4<f32>,
    /// 视图-投影矩阵
    view_projection_matrix: Matrix4<f32>,
}

impl Camera {
    /// 创建一个新的透视投影相机
    #[allow(clippy::too_many_arguments)]
    pub fn new_perspective(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov_y_degrees: f32,
        width: usize,
        height: usize,
        near: f32,
        far: f32,
    ) -> Self {
        Self::new(
            position,
            target,
            up,
            Projection::Perspective { fov_y_degrees },
            width,
            height,
            near,
            far,
        )
    }

    /// 创建一个新的正交投影相机
    #[allow(clippy::too_many_arguments)]
    pub fn new_orthographic(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        view_height: f32,
        width: usize,
        height: usize,
        near: f32,
        far: f32,
    ) -> Self {
        Self::new(
            position,
            target,
            up,
            Projection::Orthographic { view_height },
            width,
            height,
            near,
            far,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        projection: Projection,
        width: usize,
        height: usize,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Camera {
            position,
            target,
            up: up.normalize(),
            projection,
            near,
            far,
            width,
            height,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
            view_projection_matrix: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }

    /// 根据当前参数重新计算所有矩阵
    pub fn update_matrices(&mut self) {
        self.view_matrix = TransformFactory::view(&self.position, &self.target, &self.up);

        let aspect_ratio = self.aspect_ratio();
        self.projection_matrix = match self.projection {
            Projection::Perspective { fov_y_degrees } => TransformFactory::perspective(
                aspect_ratio,
                fov_y_degrees.to_radians(),
                self.near,
                self.far,
            ),
            Projection::Orthographic { view_height } => {
                let half_h = view_height * 0.5;
                let half_w = half_h * aspect_ratio;
                TransformFactory::orthographic(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        };

        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
    }

    /// 改变输出分辨率（同时改变宽高比）
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.update_matrices();
    }

    /// 围绕目标点绕 Y 轴旋转相机
    pub fn orbit_y(&mut self, angle_degrees: f32) {
        let rotation =
            TransformFactory::rotation_euler_degrees(&Vector3::new(0.0, angle_degrees, 0.0));
        let offset = self.position - self.target;
        self.position = self.target + rotation * offset;
        self.update_matrices();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.view_projection_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::transform::project_point;

    fn ortho() -> Camera {
        Camera::new_orthographic(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            2.0,
            16,
            8,
            0.1,
            10.0,
        )
    }

    #[test]
    fn orthographic_width_follows_aspect() {
        let camera = ortho();
        let vp = camera.view_projection_matrix();
        let right_edge = project_point(&vp, &Point3::new(2.0, 0.0, 0.0));
        let top_edge = project_point(&vp, &Point3::new(0.0, 1.0, 0.0));
        assert!((right_edge.x - 1.0).abs() < 1e-5);
        assert!((top_edge.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn set_viewport_updates_projection() {
        let mut camera = ortho();
        camera.set_viewport(8, 8);
        assert_eq!((camera.width(), camera.height()), (8, 8));
        let p = project_point(&camera.view_projection_matrix(), &Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = Camera::new_perspective(
            Point3::new(0.0, 1.0, 4.0),
            Point3::origin(),
            Vector3::y(),
            60.0,
            320,
            240,
            0.1,
            100.0,
        );
        let before = (camera.position - camera.target).norm();
        camera.orbit_y(90.0);
        let after = (camera.position - camera.target).norm();
        assert!((before - after).abs() < 1e-4);
        assert!((camera.position.x - 4.0).abs() < 1e-4);
    }
}
