use log::{debug, error};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    wakeup: Condvar,
    /// 正在等待的工作线程数，只作为唤醒提示，不是精确的握手
    idle: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 固定大小的工作线程池，消费一个共享的 FIFO 任务队列
///
/// 只用于把每帧的两个缓冲区清除任务移出主线程。入队不会阻塞生产者；
/// 被唤醒的线程会清空整个队列后才重新等待。
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkQueue {
    /// 创建 `max(处理器数 - 1, 1)` 个工作线程
    pub fn new() -> Result<Self, String> {
        let processors = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_workers(processors.saturating_sub(1))
    }

    /// 创建指定数量的工作线程（至少一个）
    pub fn with_workers(count: usize) -> Result<Self, String> {
        let count = count.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            wakeup: Condvar::new(),
            idle: AtomicUsize::new(0),
        });

        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("clear-worker-{}", index))
                .spawn(move || worker_loop(&shared))
                .map_err(|e| format!("无法创建工作线程 {}: {}", index, e))?;
            workers.push(handle);
        }

        debug!("工作队列已启动，共 {} 个线程", count);
        Ok(Self { shared, workers })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// 把任务追加到队列尾部，若有空闲线程则唤醒其中一个
    pub fn enqueue<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.lock().jobs.push_back(Box::new(job));
        if self.shared.idle.load(Ordering::SeqCst) > 0 {
            self.shared.wakeup.notify_one();
        }
    }
}

fn worker_loop(shared: &Shared) {
    let mut state = shared.lock();
    loop {
        if let Some(job) = state.jobs.pop_front() {
            drop(state);
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!(
                    "{} 中的任务发生 panic，已忽略",
                    thread::current().name().unwrap_or("worker")
                );
            }
            state = shared.lock();
            continue;
        }

        if state.shutdown {
            break;
        }

        shared.idle.fetch_add(1, Ordering::SeqCst);
        state = shared
            .wakeup
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner);
        shared.idle.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wakeup.notify_all();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
