//! # 扫描线三角形填充
//!
//! 把三角形按中间顶点 B 水平切成上下两个平底/平顶子三角形，逐行填充。
//! 行和列都使用 `ceil(v - 0.5)` 的像素中心采样规则：像素中心落在三角形内
//! （或左/上边上）时才覆盖，共享边的相邻三角形既不重叠也不留缝。
//!
//! 深度在屏幕空间中仿射插值，z 越小越近。

use crate::core::frame_buffer::Color32;
use nalgebra::Point3;
use std::mem;
use std::ops::Range;

/// 屏幕空间顶点：x/y 为像素坐标，z 为NDC深度
pub type ScreenVertex = Point3<f32>;

/// 最小的正 f32（次正规数），只有恰好为零的分母才视为退化
const EPSILON: f32 = f32::from_bits(1);

/// 像素裁剪矩形，两个方向都是半开区间 `[top, bottom) × [left, right)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl ClipRect {
    pub fn new(top: i32, bottom: i32, left: i32, right: i32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// 覆盖整个 `width × height` 帧缓冲区
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, saturating_i32(height), 0, saturating_i32(width))
    }

    /// 与缓冲区实际可寻址的范围求交
    fn fit(self, stride: usize, len: usize) -> Self {
        let rows = if stride == 0 { 0 } else { len / stride };
        Self {
            top: self.top.max(0),
            bottom: self.bottom.min(saturating_i32(rows)),
            left: self.left.max(0),
            right: self.right.min(saturating_i32(stride)),
        }
    }
}

fn saturating_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// 按采样规则取整后夹到 `[lo, hi]`；NaN 转换为 0 后同样被夹住
fn ceil_clamped(value: f32, lo: i32, hi: i32) -> i32 {
    (value.ceil() as i32).max(lo).min(hi)
}

/// 沿一条非水平边逐行推进的 x/z 状态
#[derive(Debug, Clone, Copy)]
struct Edge {
    /// 已减去 0.5 的列偏移，行内直接 `ceil` 即可
    x: f32,
    z: f32,
    dxy: f32,
    dzy: f32,
}

impl Edge {
    /// 从边的起点出发，求第一条采样行（距起点 `offset_y`）处的值
    fn start(x0: f32, z0: f32, offset_y: f32, dxy: f32, dzy: f32) -> Self {
        Self {
            x: x0 + offset_y * dxy - 0.5,
            z: z0 + offset_y * dzy,
            dxy,
            dzy,
        }
    }

    fn step(&mut self) {
        self.x += self.dxy;
        self.z += self.dzy;
    }
}

struct Target<'a> {
    color_buffer: &'a mut [Color32],
    depth_buffer: &'a mut [f32],
    stride: usize,
    clip: ClipRect,
    color: Color32,
    /// 整个三角形共用的 dz/dx
    dzx: f32,
}

impl Target<'_> {
    fn rows(&self, y_start: f32, y_end: f32) -> Range<i32> {
        let top = self.clip.top;
        let bottom = self.clip.bottom;
        ceil_clamped(y_start - 0.5, top, bottom)..ceil_clamped(y_end - 0.5, top, bottom)
    }

    fn fill_span(&mut self, rows: Range<i32>, mut left: Edge, mut right: Edge) {
        for row in rows {
            let x_min = ceil_clamped(left.x, self.clip.left, self.clip.right);
            let x_max = ceil_clamped(right.x, self.clip.left, self.clip.right);

            if x_min < x_max {
                let base = row as usize * self.stride;
                let span = base + x_min as usize..base + x_max as usize;
                let mut z = left.z;
                for (depth, pixel) in self.depth_buffer[span.clone()]
                    .iter_mut()
                    .zip(&mut self.color_buffer[span])
                {
                    if z < *depth {
                        *depth = z;
                        *pixel = self.color;
                    }
                    z += self.dzx;
                }
            }

            left.step();
            right.step();
        }
    }
}

/// 用纯色填充一个三角形，逐像素深度测试
///
/// 三个顶点可以是任意顺序。`stride` 为行跨度（以元素计），`clip` 限定可写的像素范围；
/// 调用方通常传入整个帧缓冲区。只有插值深度严格小于已存深度时才同时写入深度和颜色，
/// 相等时保持原值。零高度或共线的退化三角形直接跳过。
#[allow(clippy::too_many_arguments)]
pub fn fill_triangle(
    a: ScreenVertex,
    b: ScreenVertex,
    c: ScreenVertex,
    color: Color32,
    color_buffer: &mut [Color32],
    depth_buffer: &mut [f32],
    stride: usize,
    clip: ClipRect,
) {
    let (mut a, mut b, mut c) = (a, b, c);
    if a.y > c.y {
        mem::swap(&mut a, &mut c);
    }
    if a.y > b.y {
        mem::swap(&mut a, &mut b);
    }
    if b.y > c.y {
        mem::swap(&mut b, &mut c);
    }

    // NaN 坐标与零高度一样按退化处理
    let ac_y = c.y - a.y;
    if ac_y.is_nan() || ac_y < EPSILON {
        return;
    }

    // AC 边上 x 随 y 的变化率
    let d_ac_xy = (c.x - a.x) / ac_y;
    let ab_y = b.y - a.y;

    // AC 上与 B 同高的点 D，把三角形水平切开
    let d_x = a.x + d_ac_xy * ab_y;
    let bd_x = d_x - b.x;
    if bd_x.is_nan() || bd_x.abs() < EPSILON {
        return;
    }

    let d_ac_zy = (c.z - a.z) / ac_y;
    let d_z = a.z + d_ac_zy * ab_y;

    let len = color_buffer.len().min(depth_buffer.len());
    let mut target = Target {
        color_buffer,
        depth_buffer,
        stride,
        clip: clip.fit(stride, len),
        color,
        dzx: (d_z - b.z) / bd_x,
    };

    if ab_y > EPSILON {
        let d_ab_xy = (b.x - a.x) / ab_y;
        let d_ab_zy = (b.z - a.z) / ab_y;

        let rows = target.rows(a.y, b.y);
        // 顶点到第一行像素中心的竖直距离
        let offset_y = rows.start as f32 - a.y + 0.5;

        let ab = Edge::start(a.x, a.z, offset_y, d_ab_xy, d_ab_zy);
        let ac = Edge::start(a.x, a.z, offset_y, d_ac_xy, d_ac_zy);
        let (left, right) = if d_ab_xy < d_ac_xy { (ab, ac) } else { (ac, ab) };
        target.fill_span(rows, left, right);
    }

    let bc_y = c.y - b.y;
    if bc_y > EPSILON {
        let d_bc_xy = (c.x - b.x) / bc_y;
        let d_bc_zy = (c.z - b.z) / bc_y;

        let rows = target.rows(b.y, c.y);
        let offset_y = rows.start as f32 - b.y + 0.5;

        // 两条边在 C 处汇合，斜率较大的一条在左
        let bc = Edge::start(b.x, b.z, offset_y, d_bc_xy, d_bc_zy);
        let dc = Edge::start(d_x, d_z, offset_y, d_ac_xy, d_ac_zy);
        let (left, right) = if d_ac_xy < d_bc_xy { (bc, dc) } else { (dc, bc) };
        target.fill_span(rows, left, right);
    }
}
