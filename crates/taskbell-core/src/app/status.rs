//! Status - タスク集合の集計

use serde::{Deserialize, Serialize};

use crate::domain::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub open: usize,
    pub completed: usize,
    /// Tasks whose reminder has gone out (completed or not).
    pub reminded: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = TaskCounts::default();
        for task in tasks {
            if task.is_completed() {
                counts.completed += 1;
            } else {
                counts.open += 1;
            }
            if task.is_notified() {
                counts.reminded += 1;
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.open + self.completed
    }
}
