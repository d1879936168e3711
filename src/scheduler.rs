use std::time::Duration;

/// Identifies one scheduled task. Handles are never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    handle: TaskHandle,
    deadline: Duration,
}

/// One-shot deadline scheduler polled by the event loop.
///
/// Nothing runs on its own: the owner calls [`Scheduler::pop_due`] with the
/// current time and reacts to whatever handles come back. Cancelling a task
/// removes it, so a cancelled task can never be returned later.
#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Duration) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;

        // keep tasks ordered by deadline, ties in scheduling order
        let idx = self.tasks.partition_point(|t| t.deadline <= deadline);
        self.tasks.insert(idx, ScheduledTask { handle, deadline });
        handle
    }

    /// Returns true if the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.tasks.iter().position(|t| t.handle == handle) {
            Some(idx) => {
                self.tasks.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the earliest task whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<TaskHandle> {
        match self.tasks.first() {
            Some(task) if task.deadline <= now => Some(self.tasks.remove(0).handle),
            _ => None,
        }
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.first().map(|t| t.deadline)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
