/// Lifecycle of a scheduled task
///
/// A task is created `NotStarted`, becomes `Running` when scheduled and
/// stays so until it is cancelled or finishes on its own. `Cancelled` is
/// terminal: the task body never runs again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskState {
    #[default]
    NotStarted,
    Running,
    Cancelled,
}

impl TaskState {
    /// Running, or scheduled to run on the next tick
    pub fn is_active(&self) -> bool {
        matches!(self, TaskState::Running)
    }

    /// `NotStarted -> Running`; any other state is left alone
    pub fn start(&mut self) {
        if *self == TaskState::NotStarted {
            *self = TaskState::Running;
        }
    }

    pub fn cancel(&mut self) {
        *self = TaskState::Cancelled;
    }
}
