use nalgebra::{Point3, Vector3};

/// 顶点深度是否位于开区间 (-1, 1) 内；NaN 一律视为越界
#[inline]
pub fn is_depth_in_range(vertex: &Point3<f32>) -> bool {
    vertex.z > -1.0 && vertex.z < 1.0
}

/// 粗略的近/远裁剪：任一顶点越界则整个三角形丢弃，不做细分
#[inline]
pub fn is_triangle_depth_in_range(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> bool {
    is_depth_in_range(a) && is_depth_in_range(b) && is_depth_in_range(c)
}

/// 屏幕空间有向面积（两条边叉积的 z 分量）
#[inline]
pub fn signed_area(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// 由缩放三个分量符号之积决定的面朝向符号，负缩放会翻转所有三角形的绕序
pub fn face_orientation(scale: &Vector3<f32>) -> f32 {
    if scale.x * scale.y * scale.z >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// 正面判定
///
/// 屏幕 y 轴向下，逆时针的正面投影后有向面积为负。
#[inline]
pub fn is_front_facing(
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
    face_orientation: f32,
) -> bool {
    signed_area(a, b, c) * face_orientation < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_range_is_open_interval() {
        assert!(is_depth_in_range(&Point3::new(0.0, 0.0, 0.999)));
        assert!(!is_depth_in_range(&Point3::new(0.0, 0.0, 1.0)));
        assert!(!is_depth_in_range(&Point3::new(0.0, 0.0, -1.0)));
        assert!(!is_depth_in_range(&Point3::new(0.0, 0.0, f32::NAN)));

        let ok = Point3::new(0.0, 0.0, 0.5);
        let behind = Point3::new(0.0, 0.0, -1.5);
        assert!(is_triangle_depth_in_range(&ok, &ok, &ok));
        assert!(!is_triangle_depth_in_range(&ok, &behind, &ok));
    }

    #[test]
    fn winding_and_mirroring() {
        // 屏幕上看是逆时针，但 y 向下时有向面积为负
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.0, 4.0, 0.0);
        let c = Point3::new(4.0, 0.0, 0.0);
        assert!(signed_area(&a, &b, &c) < 0.0);
        assert!(is_front_facing(&a, &b, &c, 1.0));
        assert!(!is_front_facing(&a, &c, &b, 1.0));
        assert!(is_front_facing(&a, &c, &b, -1.0));
    }

    #[test]
    fn orientation_from_scale_signs() {
        assert_eq!(face_orientation(&Vector3::new(1.0, 2.0, 3.0)), 1.0);
        assert_eq!(face_orientation(&Vector3::new(-1.0, 2.0, 3.0)), -1.0);
        assert_eq!(face_orientation(&Vector3::new(-1.0, -2.0, 3.0)), 1.0);
        assert_eq!(face_orientation(&Vector3::new(0.0, -2.0, 3.0)), 1.0);
    }
}
