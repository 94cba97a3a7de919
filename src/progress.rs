// src/progress.rs

//! Liveness spinner for long-running external tools
//!
//! Every pipeline stage blocks on exactly one external process. While it
//! runs, a single background thread ticks a spinner until the process
//! finishes. The thread shares nothing with the caller except a completion
//! flag, and it is joined before the caller continues, so the spinner has no
//! bearing on ordering or results.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Sets the completion flag even if the work panics, so the join never hangs
struct DoneGuard<'a>(&'a AtomicBool);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Run `work` while a spinner labelled `message` is shown
///
/// With `enabled == false` the work runs directly with no terminal output.
pub fn run_with_spinner<T>(message: &str, enabled: bool, work: impl FnOnce() -> T) -> T {
    if !enabled {
        return work();
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());

    let done = AtomicBool::new(false);
    let result = thread::scope(|scope| {
        scope.spawn(|| {
            while !done.load(Ordering::Acquire) {
                bar.tick();
                thread::sleep(TICK);
            }
        });

        let _guard = DoneGuard(&done);
        work()
    });

    bar.finish_and_clear();
    result
}
