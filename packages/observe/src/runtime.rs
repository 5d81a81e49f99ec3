//! Thread-local tracking and batching state.

use std::cell::{Cell as StdCell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::signal::Signal;
use crate::watch::WatcherInner;

thread_local! {
    /// Dependency frames. `None` frames suppress tracking (see [`untracked`]).
    static FRAMES: RefCell<Vec<Option<Vec<Signal>>>> = const { RefCell::new(Vec::new()) };
    static BATCH_DEPTH: StdCell<usize> = const { StdCell::new(0) };
    static FLUSHING: StdCell<bool> = const { StdCell::new(false) };
    static PENDING: RefCell<VecDeque<Rc<WatcherInner>>> = const { RefCell::new(VecDeque::new()) };
}

/// Pops the top frame even if the tracked closure unwinds.
struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| frames.borrow_mut().pop());
    }
}

/// Record `signal` as a dependency of the innermost tracking frame.
pub(crate) fn track(signal: &Signal) {
    FRAMES.with(|frames| {
        if let Some(Some(frame)) = frames.borrow_mut().last_mut() {
            if !frame.iter().any(|s| s.ptr_eq(signal)) {
                frame.push(signal.clone());
            }
        }
    });
}

/// Run `f`, returning its output and every signal it tracked.
pub(crate) fn collect<T>(f: impl FnOnce() -> T) -> (T, Vec<Signal>) {
    FRAMES.with(|frames| frames.borrow_mut().push(Some(Vec::new())));
    let guard = FrameGuard;
    let out = f();
    let deps = FRAMES.with(|frames| {
        frames
            .borrow_mut()
            .last_mut()
            .and_then(Option::take)
            .unwrap_or_default()
    });
    drop(guard);
    (out, deps)
}

/// Run `f` without recording any dependencies for the enclosing watcher or
/// derived cell.
pub fn untracked<T>(f: impl FnOnce() -> T) -> T {
    FRAMES.with(|frames| frames.borrow_mut().push(None));
    let _guard = FrameGuard;
    f()
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let depth = BATCH_DEPTH.with(|d| {
            let depth = d.get().saturating_sub(1);
            d.set(depth);
            depth
        });
        if depth == 0 && !std::thread::panicking() {
            flush();
        }
    }
}

/// Run `f` with watcher dispatch deferred until the outermost batch ends.
///
/// A watcher notified any number of times inside the batch runs once, in
/// the order it was first notified.
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    BATCH_DEPTH.with(|d| d.set(d.get() + 1));
    let _guard = BatchGuard;
    f()
}

/// Queue a watcher for the current batch, or run it right away outside one.
pub(crate) fn schedule(watcher: Rc<WatcherInner>) {
    PENDING.with(|pending| pending.borrow_mut().push_back(watcher));
    if BATCH_DEPTH.with(StdCell::get) == 0 {
        flush();
    }
}

struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        FLUSHING.with(|f| f.set(false));
    }
}

fn flush() {
    if FLUSHING.with(|f| f.replace(true)) {
        // The outer flush loop picks up whatever gets queued now.
        return;
    }
    let _guard = FlushGuard;
    while let Some(watcher) = PENDING.with(|pending| pending.borrow_mut().pop_front()) {
        watcher.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_records_each_signal_once() {
        let a = Signal::new();
        let b = Signal::new();
        let ((), deps) = collect(|| {
            a.track();
            b.track();
            a.track();
        });
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn untracked_hides_reads() {
        let a = Signal::new();
        let ((), deps) = collect(|| untracked(|| a.track()));
        assert!(deps.is_empty());
    }

    #[test]
    fn nested_frames_are_independent() {
        let outer = Signal::new();
        let inner = Signal::new();
        let ((), deps) = collect(|| {
            outer.track();
            let ((), inner_deps) = collect(|| inner.track());
            assert_eq!(inner_deps.len(), 1);
        });
        assert_eq!(deps.len(), 1);
        assert!(deps[0].ptr_eq(&outer));
    }

    #[test]
    fn batch_returns_value() {
        assert_eq!(batch(|| batch(|| 7)), 7);
    }
}
