use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// 自旋多少次后让出一次线程时间片
const SPINS_PER_YIELD: u32 = 64;

/// 一帧缓冲区清除任务的完成计数器
///
/// 每次 `presented()` 都会创建一个新的令牌，因此旧缓冲区上的过期任务
/// 不会影响新缓冲区的等待。计数只通过原子操作修改，从不在队列锁内修改。
#[derive(Debug, Clone)]
pub struct ClearToken {
    outstanding: Arc<AtomicUsize>,
}

impl ClearToken {
    /// 创建一个初始计数为 `jobs` 的令牌
    pub fn armed(jobs: usize) -> Self {
        Self {
            outstanding: Arc::new(AtomicUsize::new(jobs)),
        }
    }

    /// 一个清除任务完成时调用
    pub fn complete(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::Release);
        debug_assert!(previous > 0, "ClearToken 计数下溢");
    }

    /// 尚未完成的任务数
    pub fn pending(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn is_clear(&self) -> bool {
        self.pending() == 0
    }

    /// 忙等直到所有任务完成
    ///
    /// 清除任务相对一帧的工作量很短，所以这里自旋而不是阻塞。没有超时。
    pub fn spin_wait(&self) {
        let mut spins = 0u32;
        while !self.is_clear() {
            std::hint::spin_loop();
            spins += 1;
            if spins % SPINS_PER_YIELD == 0 {
                thread::yield_now();
            }
        }
    }
}
