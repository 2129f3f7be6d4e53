#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotRunning,
    Running,
    /// Stop was requested; the current iteration is finishing.
    Stopping,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::NotRunning => "not_running",
            RunState::Running => "running",
            RunState::Stopping => "stopping",
        }
    }
}
