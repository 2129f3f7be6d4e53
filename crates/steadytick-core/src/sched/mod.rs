mod report;
mod scheduler;
mod state;

pub use report::IterationReport;
pub use scheduler::Scheduler;
pub use state::RunState;
