use crate::core::frame_buffer::{Color32, FrameBuffers, PendingClear};
use crate::core::rasterizer::fill_triangle;
use crate::core::work_queue::WorkQueue;
use crate::geometry::camera::Camera;
use crate::geometry::culling::{face_orientation, is_front_facing, is_triangle_depth_in_range};
use crate::geometry::frustum::FrustumPlanes;
use crate::geometry::transform::{TransformFactory, project_points_into};
use log::{debug, warn};
use nalgebra::{Matrix4, Point3, Vector3};
use std::sync::Arc;

/// 可被渲染的对象：宿主环境每帧提供的对象接口
pub trait Renderable {
    /// 模型到世界的变换矩阵
    fn model_matrix(&self) -> Matrix4<f32>;

    /// 三个轴向的缩放，可以为负
    fn scale(&self) -> Vector3<f32>;

    fn color(&self) -> Color32;

    /// 以局部原点为中心、已乘以最大轴向缩放绝对值的包围球半径
    fn bounding_radius(&self) -> f32;

    /// 模型空间顶点
    fn vertices(&self) -> &[Point3<f32>];

    /// 三角形顶点索引
    fn triangles(&self) -> &[[u32; 3]];
}

/// 上一帧的诊断统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub objects_total: usize,
    pub objects_culled: usize,
    pub triangles_submitted: usize,
    pub triangles_depth_rejected: usize,
    pub triangles_backfacing: usize,
    /// 按对象顺序记录本帧是否通过了包围球剔除
    pub object_visible: Vec<bool>,
}

impl RenderStats {
    fn reset(&mut self, objects: usize) {
        self.objects_total = objects;
        self.objects_culled = 0;
        self.triangles_submitted = 0;
        self.triangles_depth_rejected = 0;
        self.triangles_backfacing = 0;
        self.object_visible.clear();
        self.object_visible.resize(objects, false);
    }
}

/// 一帧渲染结果的只读视图
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub width: usize,
    pub height: usize,
    pub color: &'a [Color32],
    pub depth: &'a [f32],
}

impl FrameView<'_> {
    pub fn color_at(&self, x: usize, y: usize) -> Color32 {
        self.color[y * self.width + x]
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }
}

/// 单线程的逐帧组装器：剔除、投影、提交三角形
///
/// 帧结束后由宿主调用 `presented()`，两个缓冲区随即交给后台清除；
/// 下一帧开始前等待清除完成再写入同一对缓冲区。
pub struct Renderer {
    queue: Arc<WorkQueue>,
    background: Color32,
    buffers: Option<FrameBuffers>,
    pending: Option<PendingClear>,
    /// 当前缓冲区里是否有上一帧的内容
    needs_clear: bool,
    /// 投影后的顶点，跨帧复用
    vertex_buffer: Vec<Point3<f32>>,
    stats: RenderStats,
}

impl Renderer {
    pub fn new(queue: Arc<WorkQueue>) -> Self {
        Self::with_background(queue, Color32::TRANSPARENT)
    }

    pub fn with_background(queue: Arc<WorkQueue>, background: Color32) -> Self {
        Renderer {
            queue,
            background,
            buffers: None,
            pending: None,
            needs_clear: false,
            vertex_buffer: Vec::new(),
            stats: RenderStats::default(),
        }
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub fn last_stats(&self) -> &RenderStats {
        &self.stats
    }

    /// 尚未完成的后台清除任务数
    pub fn pending_clears(&self) -> usize {
        self.pending
            .as_ref()
            .map_or(0, |pending| pending.token().pending())
    }

    /// 渲染一帧，返回颜色与深度缓冲区
    pub fn render<R: Renderable>(&mut self, camera: &Camera, objects: &[R]) -> FrameView<'_> {
        let (width, height) = (camera.width(), camera.height());
        let mut buffers = self.acquire_buffers(width, height);

        let view_projection = camera.view_projection_matrix();
        let world_to_screen =
            TransformFactory::viewport(width as f32, height as f32) * view_projection;
        let frustum = FrustumPlanes::from_matrix(&view_projection);

        let mut stats = std::mem::take(&mut self.stats);
        stats.reset(objects.len());

        for (index, object) in objects.iter().enumerate() {
            let model_matrix = object.model_matrix();
            let origin = Point3::new(model_matrix.m14, model_matrix.m24, model_matrix.m34);

            if frustum.is_sphere_outside(&origin, object.bounding_radius()) {
                stats.objects_culled += 1;
                continue;
            }
            stats.object_visible[index] = true;

            draw_object(
                object,
                &(world_to_screen * model_matrix),
                &mut self.vertex_buffer,
                &mut buffers,
                &mut stats,
            );
        }

        debug!(
            "帧 {}x{}: 对象 {}/{} 被剔除，提交 {} 个三角形（深度越界 {}，背面 {}）",
            width,
            height,
            stats.objects_culled,
            stats.objects_total,
            stats.triangles_submitted,
            stats.triangles_depth_rejected,
            stats.triangles_backfacing
        );
        self.stats = stats;

        let buffers = self.buffers.insert(buffers);
        FrameView {
            width: buffers.width,
            height: buffers.height,
            color: &buffers.color,
            depth: &buffers.depth,
        }
    }

    /// 宿主读取完颜色缓冲区后调用，启动两个后台清除任务
    pub fn presented(&mut self) {
        let Some(buffers) = self.buffers.take() else {
            return;
        };
        self.pending = Some(buffers.begin_clear(&self.queue, self.background));
        self.needs_clear = false;
    }

    /// 取得本帧要写入的缓冲区
    ///
    /// 分辨率不变时自旋等待上一帧的清除完成；分辨率变化时立即分配新缓冲区，
    /// 不等待旧缓冲区上的清除任务。
    fn acquire_buffers(&mut self, width: usize, height: usize) -> FrameBuffers {
        if let Some(pending) = self.pending.take() {
            if pending.matches(width, height) {
                match pending.finish() {
                    Some(buffers) => {
                        self.needs_clear = false;
                        return self.keep_or_clear(buffers);
                    }
                    None => warn!("后台清除任务未能归还缓冲区，重新分配"),
                }
            } else {
                debug!("分辨率变为 {}x{}，放弃旧缓冲区上的清除任务", width, height);
            }
        }

        match self.buffers.take() {
            Some(buffers) if buffers.matches(width, height) => self.keep_or_clear(buffers),
            _ => {
                debug!("分配 {}x{} 帧缓冲区", width, height);
                self.needs_clear = true;
                FrameBuffers::new(width, height, self.background)
            }
        }
    }

    /// 未经 `presented()` 的旧内容在本线程上同步清除
    fn keep_or_clear(&mut self, mut buffers: FrameBuffers) -> FrameBuffers {
        if self.needs_clear {
            debug!("上一帧未调用 presented()，同步清除缓冲区");
            buffers.clear(self.background);
        }
        self.needs_clear = true;
        buffers
    }
}

fn draw_object<R: Renderable>(
    object: &R,
    model_to_screen: &Matrix4<f32>,
    vertex_buffer: &mut Vec<Point3<f32>>,
    buffers: &mut FrameBuffers,
    stats: &mut RenderStats,
) {
    project_points_into(model_to_screen, object.vertices(), vertex_buffer);

    let orientation = face_orientation(&object.scale());
    let color = object.color();
    let clip = buffers.clip_rect();
    let stride = buffers.width;

    for &[i0, i1, i2] in object.triangles() {
        let (Some(a), Some(b), Some(c)) = (
            vertex_buffer.get(i0 as usize),
            vertex_buffer.get(i1 as usize),
            vertex_buffer.get(i2 as usize),
        ) else {
            continue;
        };

        if !is_triangle_depth_in_range(a, b, c) {
            stats.triangles_depth_rejected += 1;
            continue;
        }
        if !is_front_facing(a, b, c, orientation) {
            stats.triangles_backfacing += 1;
            continue;
        }

        stats.triangles_submitted += 1;
        fill_triangle(
            *a,
            *b,
            *c,
            color,
            &mut buffers.color,
            &mut buffers.depth,
            stride,
            clip,
        );
    }
}
