use nalgebra::{Matrix4, Point3, Vector4};

/// 视锥体的六个平面 `(a, b, c, d)`，法线 `(a, b, c)` 已归一化并指向视锥内部
///
/// 顺序为 近、远、左、右、下、上。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumPlanes {
    planes: [Vector4<f32>; 6],
}

impl FrustumPlanes {
    /// 从视图-投影矩阵的行组合中提取平面，对透视和正交投影都适用
    pub fn from_matrix(view_projection: &Matrix4<f32>) -> Self {
        let row = |i: usize| -> Vector4<f32> { view_projection.row(i).transpose() };
        let (p1, p2, p3, p4) = (row(0), row(1), row(2), row(3));

        let planes = [p4 + p3, p4 - p3, p4 + p1, p4 - p1, p4 + p2, p4 - p2].map(normalize_plane);
        Self { planes }
    }

    pub fn planes(&self) -> &[Vector4<f32>; 6] {
        &self.planes
    }

    /// 点到平面的有符号距离，在视锥内侧为正
    pub fn signed_distance(plane: &Vector4<f32>, point: &Point3<f32>) -> f32 {
        plane.dot(&point.to_homogeneous())
    }

    /// 包围球是否完全位于某一个平面之外
    ///
    /// 这是保守测试：只要返回 `true`，球体必定不可见。
    pub fn is_sphere_outside(&self, center: &Point3<f32>, radius: f32) -> bool {
        self.planes
            .iter()
            .any(|plane| Self::signed_distance(plane, center) < -radius)
    }
}

fn normalize_plane(plane: Vector4<f32>) -> Vector4<f32> {
    plane / plane.xyz().norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::transform::TransformFactory;
    use nalgebra::Vector3;

    fn unit_box() -> FrustumPlanes {
        // 视体 x,y ∈ [-1, 1]，z ∈ [-1, -9]
        let projection = TransformFactory::orthographic(-1.0, 1.0, -1.0, 1.0, 1.0, 9.0);
        FrustumPlanes::from_matrix(&projection)
    }

    #[test]
    fn planes_are_normalized() {
        for plane in unit_box().planes() {
            assert!((plane.xyz().norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn orthographic_planes_are_box_faces() {
        let frustum = unit_box();
        let [near, far, left, right, bottom, top] = *frustum.planes();
        let origin = Point3::new(0.0, 0.0, -5.0);
        assert!((FrustumPlanes::signed_distance(&near, &origin) - 4.0).abs() < 1e-4);
        assert!((FrustumPlanes::signed_distance(&far, &origin) - 4.0).abs() < 1e-4);
        for plane in [left, right, bottom, top] {
            assert!((FrustumPlanes::signed_distance(&plane, &origin) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_outside_any_single_plane_is_culled() {
        let frustum = unit_box();
        let inside = Point3::new(0.0, 0.0, -5.0);
        assert!(!frustum.is_sphere_outside(&inside, 0.5));

        let beyond = [
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::new(0.0, 0.0, -15.0),
            Vector3::new(-3.0, 0.0, -5.0),
            Vector3::new(3.0, 0.0, -5.0),
            Vector3::new(0.0, -3.0, -5.0),
            Vector3::new(0.0, 3.0, -5.0),
        ];
        for center in beyond {
            assert!(frustum.is_sphere_outside(&Point3::from(center), 0.5), "{center:?}");
        }
    }

    #[test]
    fn straddling_sphere_is_kept() {
        let frustum = unit_box();
        assert!(!frustum.is_sphere_outside(&Point3::new(1.4, 0.0, -5.0), 0.5));
        assert!(!frustum.is_sphere_outside(&Point3::new(0.0, 0.0, -0.6), 0.5));
    }

    #[test]
    fn perspective_planes_cull_behind_camera() {
        let projection = TransformFactory::perspective(1.0, 90f32.to_radians(), 0.1, 100.0);
        let frustum = FrustumPlanes::from_matrix(&projection);
        assert!(frustum.is_sphere_outside(&Point3::new(0.0, 0.0, 5.0), 1.0));
        assert!(!frustum.is_sphere_outside(&Point3::new(0.0, 0.0, -5.0), 1.0));
    }
}
