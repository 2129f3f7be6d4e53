use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal shared between the loop and anything that may end it.
///
/// Holds the loop's `running` flag. Clones share the flag, so a handle moved to
/// another thread (or into a Ctrl-C handler) can stop a loop blocked in `start()`.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to finish its current iteration. Idempotent.
    #[inline]
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Set by the loop when a run begins; a stop issued earlier does not carry over.
    #[inline]
    pub(crate) fn arm(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Routes Ctrl-C to [`StopHandle::stop`]. Only one handler can be installed per process.
    pub fn install_ctrlc_handler(&self) -> anyhow::Result<()> {
        let s = self.clone();
        ctrlc::set_handler(move || s.stop())?;
        Ok(())
    }
}
