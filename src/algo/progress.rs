//! Progress reporting for long-running algorithms.
//!
//! Local fairing runs thousands of passes over the mesh; a [`Progress`]
//! callback lets a front end show how far along it is without the solver
//! knowing anything about terminals or windows.
//!
//! # Example
//!
//! ```
//! use fairmesh::algo::Progress;
//!
//! let progress = Progress::new(|current, total, stage| {
//!     eprintln!("[{}/{}] {}", current, total, stage);
//! });
//! progress.report(1, 10, "local fairing");
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Steps completed so far
/// - `total`: Total number of steps
/// - `stage`: Name of the running operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, stage: &str) {
        (self.callback)(current, total, stage);
    }

    /// Report progress only every `stride` steps, plus the final step.
    ///
    /// Keeps per-iteration loops from flooding the callback.
    #[inline]
    pub fn report_every(&self, stride: usize, current: usize, total: usize, stage: &str) {
        if current == total || stride <= 1 || current % stride == 0 {
            self.report(current, total, stage);
        }
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_report_every() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, _, _| sink.lock().unwrap().push(current));

        for i in 0..=10 {
            progress.report_every(4, i, 10, "test");
        }
        assert_eq!(*seen.lock().unwrap(), vec![0, 4, 8, 10]);
    }
}
