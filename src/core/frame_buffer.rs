use crate::core::buffer_clear;
use crate::core::clear_token::ClearToken;
use crate::core::rasterizer::ClipRect;
use crate::core::work_queue::WorkQueue;
use std::sync::mpsc::{self, Receiver};

/// 深度缓冲区的清除值，对应远裁剪平面的NDC深度
pub const FAR_DEPTH: f32 = 1.0;

/// 每像素一个元素的RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color32 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

/// 颜色缓冲区与深度缓冲区
///
/// 两者长度始终相同（`width * height`，行优先，行跨度为 `width`），
/// 分辨率变化时一起重新分配。
#[derive(Debug)]
pub struct FrameBuffers {
    pub width: usize,
    pub height: usize,
    pub color: Vec<Color32>,
    pub depth: Vec<f32>,
}

impl FrameBuffers {
    /// 分配一对已处于基准状态（背景色、远深度）的缓冲区
    pub fn new(width: usize, height: usize, background: Color32) -> Self {
        let num_pixels = width * height;
        Self {
            width,
            height,
            color: vec![background; num_pixels],
            depth: vec![FAR_DEPTH; num_pixels],
        }
    }

    pub fn len(&self) -> usize {
        self.color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    pub fn matches(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }

    /// 覆盖整个缓冲区的裁剪矩形
    pub fn clip_rect(&self) -> ClipRect {
        ClipRect::full(self.width, self.height)
    }

    /// 在调用线程上同步清除
    pub fn clear(&mut self, background: Color32) {
        buffer_clear::fill(&mut self.color, background);
        buffer_clear::fill(&mut self.depth, FAR_DEPTH);
    }

    /// 把两个缓冲区交给工作队列后台清除，每个缓冲区一个任务
    ///
    /// 缓冲区按值移入任务，清除完成后经由通道送回。返回的 `PendingClear`
    /// 持有本帧的完成令牌，计数初始为 2。
    pub fn begin_clear(self, queue: &WorkQueue, background: Color32) -> PendingClear {
        let token = ClearToken::armed(2);
        let (color_tx, color_rx) = mpsc::sync_channel(1);
        let (depth_tx, depth_rx) = mpsc::sync_channel(1);

        let mut color = self.color;
        let color_done = CompleteOnDrop(token.clone());
        queue.enqueue(move || {
            buffer_clear::fill(&mut color, background);
            // 接收端可能因分辨率变化已被丢弃，此时缓冲区随任务一起释放
            let _ = color_tx.send(color);
            drop(color_done);
        });

        let mut depth = self.depth;
        let depth_done = CompleteOnDrop(token.clone());
        queue.enqueue(move || {
            buffer_clear::fill(&mut depth, FAR_DEPTH);
            let _ = depth_tx.send(depth);
            drop(depth_done);
        });

        PendingClear {
            width: self.width,
            height: self.height,
            token,
            color_rx,
            depth_rx,
        }
    }
}

/// 任务结束（包括 panic 展开）时递减令牌
struct CompleteOnDrop(ClearToken);

impl Drop for CompleteOnDrop {
    fn drop(&mut self) {
        self.0.complete();
    }
}

/// 正在后台清除的一对缓冲区
#[derive(Debug)]
pub struct PendingClear {
    width: usize,
    height: usize,
    token: ClearToken,
    color_rx: Receiver<Vec<Color32>>,
    depth_rx: Receiver<Vec<f32>>,
}

impl PendingClear {
    pub fn matches(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }

    pub fn token(&self) -> &ClearToken {
        &self.token
    }

    /// 自旋等待两个清除任务完成并取回缓冲区
    ///
    /// 如果某个任务没能送回缓冲区（任务 panic），返回 `None`。
    pub fn finish(self) -> Option<FrameBuffers> {
        self.token.spin_wait();
        let color = self.color_rx.try_recv().ok()?;
        let depth = self.depth_rx.try_recv().ok()?;
        Some(FrameBuffers {
            width: self.width,
            height: self.height,
            color,
            depth,
        })
    }
}
