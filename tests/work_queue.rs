use soft_rasterizer::core::clear_token::ClearToken;
use soft_rasterizer::core::work_queue::WorkQueue;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

#[test]
fn every_job_runs_exactly_once_with_many_producers() {
    const PRODUCERS: usize = 4;
    const JOBS_PER_PRODUCER: usize = 2500;

    let runs: Arc<Vec<AtomicUsize>> = Arc::new(
        (0..PRODUCERS * JOBS_PER_PRODUCER)
            .map(|_| AtomicUsize::new(0))
            .collect(),
    );

    {
        let queue = WorkQueue::with_workers(4).unwrap();
        thread::scope(|scope| {
            for producer in 0..PRODUCERS {
                let queue = &queue;
                let runs = Arc::clone(&runs);
                scope.spawn(move || {
                    for job in 0..JOBS_PER_PRODUCER {
                        let runs = Arc::clone(&runs);
                        let slot = producer * JOBS_PER_PRODUCER + job;
                        queue.enqueue(move || {
                            runs[slot].fetch_add(1, Ordering::Relaxed);
                        });
                    }
                });
            }
        });
        // 析构时等待所有已入队任务执行完毕
    }

    for (slot, count) in runs.iter().enumerate() {
        assert_eq!(count.load(Ordering::Relaxed), 1, "job {slot}");
    }
}

#[test]
fn clear_token_reaches_zero_after_jobs_complete() {
    let queue = WorkQueue::with_workers(2).unwrap();
    for _ in 0..100 {
        let token = ClearToken::armed(2);
        for _ in 0..2 {
            let token = token.clone();
            queue.enqueue(move || token.complete());
        }
        token.spin_wait();
        assert!(token.is_clear());
        assert_eq!(token.pending(), 0);
    }
}
