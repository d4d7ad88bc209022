use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct ExecutorMetrics {
    pub tasks_executed: AtomicUsize,
    pub tasks_failed: AtomicUsize,
    pub infrastructure_faults: AtomicUsize,
    pub total_task_time: AtomicUsize,
}

impl ExecutorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_success(&self, duration: usize) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        self.total_task_time.fetch_add(duration, Ordering::Relaxed);
    }

    /// A shard answered with a SQL error.
    pub fn update_failure(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_fault(&self) {
        self.infrastructure_faults.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total number of tasks that reached their backend
    pub fn total_tasks(&self) -> usize {
        self.tasks_executed.load(Ordering::Relaxed) + self.tasks_failed.load(Ordering::Relaxed)
    }

    /// Get average task duration in microseconds
    pub fn average_task_duration(&self) -> Option<usize> {
        let total = self.tasks_executed.load(Ordering::Relaxed);
        if total == 0 {
            None
        } else {
            Some(self.total_task_time.load(Ordering::Relaxed) / total)
        }
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_tasks();
        if total == 0 {
            100.0
        } else {
            let successful = self.tasks_executed.load(Ordering::Relaxed);
            (successful as f64 / total as f64) * 100.0
        }
    }
}
