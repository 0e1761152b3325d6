use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};

/// 变换矩阵工厂，提供创建各种变换矩阵的静态方法
pub struct TransformFactory;

impl TransformFactory {
    /// 由欧拉角（度，依次绕 X/Y/Z）创建旋转
    pub fn rotation_euler_degrees(degrees: &Vector3<f32>) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        )
    }

    /// 创建平移矩阵
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(translation)
    }

    /// 创建非均匀缩放矩阵
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// 组合 平移 * 旋转 * 缩放，得到模型到世界的矩阵
    pub fn trs(
        position: &Vector3<f32>,
        rotation: &UnitQuaternion<f32>,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(position) * rotation.to_homogeneous() * Self::scaling_nonuniform(scale)
    }

    /// 创建视图矩阵 (lookAt)
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, target, &Unit::new_normalize(*up))
    }

    /// 创建透视投影矩阵，NDC 深度范围 [-1, 1]
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect_ratio, fov_y_rad, near, far)
    }

    /// 创建正交投影矩阵
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        Matrix4::new_orthographic(left, right, bottom, top, near, far)
    }

    /// 视口矩阵：NDC x∈[-1,1] → [0,width]，y∈[-1,1] → [height,0]，z 原样保留
    ///
    /// 屏幕第 0 行在图像顶部。透视除法之前或之后应用结果相同。
    pub fn viewport(width: f32, height: f32) -> Matrix4<f32> {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        #[rustfmt::skip]
        let viewport = Matrix4::new(
            half_w, 0.0,     0.0, half_w,
            0.0,    -half_h, 0.0, half_h,
            0.0,    0.0,     1.0, 0.0,
            0.0,    0.0,     0.0, 1.0,
        );
        viewport
    }
}

/// 用齐次矩阵变换一个点并做透视除法
///
/// w 为零时结果含 inf/NaN，下游的深度范围检查会把它剔除。
pub fn project_point(matrix: &Matrix4<f32>, point: &Point3<f32>) -> Point3<f32> {
    let clip = matrix * point.to_homogeneous();
    Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
}

/// 批量投影到复用的输出缓冲区，只增不减
pub fn project_points_into(
    matrix: &Matrix4<f32>,
    points: &[Point3<f32>],
    out: &mut Vec<Point3<f32>>,
) {
    out.clear();
    out.extend(points.iter().map(|point| project_point(matrix, point)));
}
