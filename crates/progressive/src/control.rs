use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Pause gate and cancellation flag shared by the controller and one worker.
///
/// The worker consults both once per pixel. Pausing parks the worker on a
/// condition variable; cancelling always reopens the gate so a paused worker
/// can observe the flag and unwind.
#[derive(Debug, Default)]
pub(crate) struct WorkerControl {
    paused: Mutex<bool>,
    wake: Condvar,
    cancelled: AtomicBool,
}

impl WorkerControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        *self.lock() = true;
    }

    pub fn resume(&self) {
        *self.lock() = false;
        self.wake.notify_all();
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        let mut paused = self.lock();
        *paused = false;
        drop(paused);
        self.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        *self.lock()
    }

    /// Blocks the calling thread while the gate is closed.
    ///
    /// Returns true when the call actually had to wait.
    pub fn wait_while_paused(&self) -> bool {
        let paused = self.lock();
        if !*paused {
            return false;
        }
        let guard = self
            .wake
            .wait_while(paused, |paused| *paused)
            .unwrap_or_else(PoisonError::into_inner);
        drop(guard);
        true
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn open_gate_does_not_block() {
        let control = WorkerControl::new();
        assert!(!control.wait_while_paused());
    }

    #[test]
    fn paused_gate_blocks_until_resumed() {
        let control = Arc::new(WorkerControl::new());
        control.pause();

        let (tx, rx) = mpsc::channel();
        let worker = {
            let control = Arc::clone(&control);
            thread::spawn(move || {
                let waited = control.wait_while_paused();
                tx.send(waited).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        control.resume();
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        worker.join().unwrap();
    }

    #[test]
    fn cancel_releases_paused_worker() {
        let control = Arc::new(WorkerControl::new());
        control.pause();

        let worker = {
            let control = Arc::clone(&control);
            thread::spawn(move || {
                control.wait_while_paused();
                control.is_cancelled()
            })
        };

        thread::sleep(Duration::from_millis(20));
        control.cancel();
        assert!(worker.join().unwrap());
        assert!(!control.is_paused());
    }
}
