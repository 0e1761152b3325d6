use nalgebra::{Point3, Vector3};

/// 内置网格的名称
pub const BUILTIN_MESHES: [&str; 5] = ["triangle", "quad", "cube", "tetrahedron", "octahedron"];

/// 模型空间中的三角网格，正面为逆时针绕序
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Point3<f32>>,
    triangles: Vec<[u32; 3]>,
    /// 未缩放时顶点到局部原点的最大距离
    bounding_radius: f32,
}

impl Mesh {
    /// 创建网格并检查所有索引
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Point3<f32>>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, String> {
        let name = name.into();
        for (i, triangle) in triangles.iter().enumerate() {
            if let Some(&index) = triangle.iter().find(|&&v| v as usize >= vertices.len()) {
                return Err(format!(
                    "网格 '{}' 的第{}个三角形索引 {} 越界（顶点数 {}）",
                    name,
                    i,
                    index,
                    vertices.len()
                ));
            }
        }

        Ok(Self::trusted(name, vertices, triangles))
    }

    /// 按名称创建内置网格
    pub fn builtin(name: &str) -> Result<Self, String> {
        match name {
            "triangle" => Ok(Self::triangle()),
            "quad" => Ok(Self::quad()),
            "cube" => Ok(Self::cube()),
            "tetrahedron" => Ok(Self::tetrahedron()),
            "octahedron" => Ok(Self::octahedron()),
            _ => Err(format!(
                "未知的网格类型 '{}'，可选: {}",
                name,
                BUILTIN_MESHES.join(", ")
            )),
        }
    }

    /// XY 平面上朝向 +Z 的单个三角形
    pub fn triangle() -> Self {
        Self::trusted(
            "triangle",
            vec![
                Point3::new(-0.5, -0.5, 0.0),
                Point3::new(0.5, -0.5, 0.0),
                Point3::new(0.0, 0.5, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    /// XY 平面上朝向 +Z 的单位正方形
    pub fn quad() -> Self {
        Self::trusted(
            "quad",
            vec![
                Point3::new(-0.5, -0.5, 0.0),
                Point3::new(0.5, -0.5, 0.0),
                Point3::new(0.5, 0.5, 0.0),
                Point3::new(-0.5, 0.5, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    /// 边长为 1 的立方体
    pub fn cube() -> Self {
        // 索引的三个二进制位依次对应 x、y、z 的正负
        let vertices = (0..8)
            .map(|i| {
                let coord = |bit: u32| if i & (1 << bit) != 0 { 0.5 } else { -0.5 };
                Point3::new(coord(0), coord(1), coord(2))
            })
            .collect();
        let triangles = vec![
            [4, 5, 7],
            [4, 7, 6],
            [0, 2, 3],
            [0, 3, 1],
            [1, 3, 7],
            [1, 7, 5],
            [0, 4, 6],
            [0, 6, 2],
            [2, 6, 7],
            [2, 7, 3],
            [0, 1, 5],
            [0, 5, 4],
        ];
        Self::trusted("cube", vertices, triangles)
    }

    pub fn tetrahedron() -> Self {
        let vertices = vec![
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(0.5, -0.5, -0.5),
            Point3::new(-0.5, 0.5, -0.5),
            Point3::new(-0.5, -0.5, 0.5),
        ];
        let faces = vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        let triangles = orient_outward(&vertices, faces);
        Self::trusted("tetrahedron", vertices, triangles)
    }

    pub fn octahedron() -> Self {
        let vertices = vec![
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(-0.5, 0.0, 0.0),
            Point3::new(0.0, 0.5, 0.0),
            Point3::new(0.0, -0.5, 0.0),
            Point3::new(0.0, 0.0, 0.5),
            Point3::new(0.0, 0.0, -0.5),
        ];
        let mut faces = Vec::with_capacity(8);
        for x in [0, 1] {
            for y in [2, 3] {
                for z in [4, 5] {
                    faces.push([x, y, z]);
                }
            }
        }
        let triangles = orient_outward(&vertices, faces);
        Self::trusted("octahedron", vertices, triangles)
    }

    // 内置网格的索引无需检查
    fn trusted(
        name: impl Into<String>,
        vertices: Vec<Point3<f32>>,
        triangles: Vec<[u32; 3]>,
    ) -> Self {
        let bounding_radius = vertices
            .iter()
            .map(|v| v.coords.norm())
            .fold(0.0f32, f32::max);
        Self {
            name: name.into(),
            vertices,
            triangles,
            bounding_radius,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// 对以原点为中心的凸多面体，把每个面翻转为法线朝外
fn orient_outward(vertices: &[Point3<f32>], triangles: Vec<[u32; 3]>) -> Vec<[u32; 3]> {
    triangles
        .into_iter()
        .map(|[a, b, c]| {
            let (pa, pb, pc) = (
                vertices[a as usize],
                vertices[b as usize],
                vertices[c as usize],
            );
            let normal: Vector3<f32> = (pb - pa).cross(&(pc - pa));
            let centroid = (pa.coords + pb.coords + pc.coords) / 3.0;
            if normal.dot(&centroid) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_closed_outward(mesh: &Mesh) {
        for &[a, b, c] in mesh.triangles() {
            let v = mesh.vertices();
            let (pa, pb, pc) = (v[a as usize], v[b as usize], v[c as usize]);
            let normal = (pb - pa).cross(&(pc - pa));
            let centroid = (pa.coords + pb.coords + pc.coords) / 3.0;
            assert!(normal.dot(&centroid) > 0.0, "{} 的面 {:?} 朝内", mesh.name(), [a, b, c]);
        }
    }

    #[test]
    fn convex_builtins_face_outward() {
        assert_closed_outward(&Mesh::cube());
        assert_closed_outward(&Mesh::tetrahedron());
        assert_closed_outward(&Mesh::octahedron());
        assert_eq!(Mesh::cube().triangle_count(), 12);
        assert_eq!(Mesh::octahedron().triangle_count(), 8);
    }

    #[test]
    fn flat_builtins_face_positive_z() {
        for mesh in [Mesh::triangle(), Mesh::quad()] {
            let v = mesh.vertices();
            for &[a, b, c] in mesh.triangles() {
                let (pa, pb, pc) = (v[a as usize], v[b as usize], v[c as usize]);
                assert!((pb - pa).cross(&(pc - pa)).z > 0.0);
            }
        }
    }

    #[test]
    fn rejects_out_of_range_index() {
        let vertices = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let err = Mesh::new("bad", vertices, vec![[0, 1, 2]]).unwrap_err();
        assert!(err.contains("bad"));
    }

    #[test]
    fn bounding_radius_is_farthest_vertex() {
        assert!((Mesh::cube().bounding_radius() - 0.75f32.sqrt()).abs() < 1e-6);
        assert!((Mesh::octahedron().bounding_radius() - 0.5).abs() < 1e-6);
        assert!(Mesh::builtin("sphere").is_err());
        for name in BUILTIN_MESHES {
            assert_eq!(Mesh::builtin(name).unwrap().name(), name);
        }
    }
}
