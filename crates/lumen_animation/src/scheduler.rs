//! Frame scheduler
//!
//! Replaces the browser's `requestAnimationFrame`/`setTimeout` pair with an
//! explicit scheduler that the host ticks once per display frame.
//!
//! Every registration returns a `FrameTask`. Cancelling (or dropping) the
//! task guarantees the callback never runs again, even when the cancel
//! happens inside another callback of the same frame.
//!
//! Callbacks must not hold a strong `FrameScheduler` clone: the scheduler owns
//! the callbacks, so that would be a reference cycle. Capture a
//! `SchedulerHandle` instead.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a registered frame callback or timeout
    pub struct FrameTaskId;
}

/// Timing of the frame being delivered
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    /// Host timestamp in milliseconds
    pub timestamp_ms: f64,
    /// Milliseconds since the previous tick (0 on the first tick)
    pub delta_ms: f64,
    /// Number of ticks before this one
    pub frame: u64,
}

/// What a frame callback wants next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Run again next frame
    Continue,
    /// Deregister after this frame
    Done,
}

type FrameCallback = Rc<RefCell<dyn FnMut(&FrameInfo) -> FrameControl>>;

enum Task {
    Frame(FrameCallback),
    Timeout {
        due_ms: f64,
        callback: Box<dyn FnOnce()>,
    },
}

/// Internal state of the frame scheduler
struct SchedulerInner {
    tasks: SlotMap<FrameTaskId, Task>,
    now_ms: f64,
    last_tick_ms: Option<f64>,
    frame: u64,
}

impl Default for SchedulerInner {
    fn default() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            now_ms: 0.0,
            last_tick_ms: None,
            frame: 0,
        }
    }
}

/// The frame scheduler that runs all frame callbacks and timeouts
///
/// Owned by the host; cloning yields another strong handle to the same
/// scheduler.
#[derive(Clone, Default)]
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a weak handle for use inside callbacks
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Run `callback` on every frame until it returns `Done` or is cancelled
    ///
    /// A task registered during a tick first runs on the following tick.
    pub fn request_frame<F>(&self, callback: F) -> FrameTask
    where
        F: FnMut(&FrameInfo) -> FrameControl + 'static,
    {
        let id = self
            .inner
            .borrow_mut()
            .tasks
            .insert(Task::Frame(Rc::new(RefCell::new(callback))));
        FrameTask::new(id, self.handle())
    }

    /// Run `callback` once, on the first tick at least `delay_ms` after the
    /// most recent tick
    pub fn request_timeout<F>(&self, delay_ms: f64, callback: F) -> FrameTask
    where
        F: FnOnce() + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let due_ms = inner.now_ms + delay_ms.max(0.0);
        let id = inner.tasks.insert(Task::Timeout {
            due_ms,
            callback: Box::new(callback),
        });
        drop(inner);
        FrameTask::new(id, self.handle())
    }

    /// Advance to `timestamp_ms` and run every due task
    ///
    /// Returns the number of callbacks that ran.
    pub fn tick(&self, timestamp_ms: f64) -> usize {
        let (info, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            let delta_ms = inner
                .last_tick_ms
                .map(|last| (timestamp_ms - last).max(0.0))
                .unwrap_or(0.0);
            let info = FrameInfo {
                timestamp_ms,
                delta_ms,
                frame: inner.frame,
            };
            inner.frame += 1;
            inner.now_ms = timestamp_ms;
            inner.last_tick_ms = Some(timestamp_ms);
            let snapshot: Vec<FrameTaskId> = inner.tasks.keys().collect();
            (info, snapshot)
        };

        let mut ran = 0;
        for id in snapshot {
            let step = {
                let mut inner = self.inner.borrow_mut();
                // Missing means cancelled by an earlier callback of this frame
                let timeout_due = match inner.tasks.get(id) {
                    None => continue,
                    Some(Task::Frame(_)) => false,
                    Some(Task::Timeout { due_ms, .. }) => {
                        if *due_ms > timestamp_ms {
                            continue;
                        }
                        true
                    }
                };
                if timeout_due {
                    match inner.tasks.remove(id) {
                        Some(Task::Timeout { callback, .. }) => Step::Timeout(callback),
                        _ => continue,
                    }
                } else {
                    match inner.tasks.get(id) {
                        Some(Task::Frame(callback)) => Step::Frame(Rc::clone(callback)),
                        _ => continue,
                    }
                }
            };

            match step {
                Step::Frame(callback) => {
                    let Ok(mut callback) = callback.try_borrow_mut() else {
                        tracing::trace!("skipping re-entrant frame callback");
                        continue;
                    };
                    let control = (*callback)(&info);
                    drop(callback);
                    if control == FrameControl::Done {
                        let finished = self.inner.borrow_mut().tasks.remove(id);
                        drop(finished);
                    }
                }
                Step::Timeout(callback) => callback(),
            }
            ran += 1;
        }

        tracing::trace!(frame = info.frame, ran, "frame tick");
        ran
    }

    /// Number of registered frame callbacks and pending timeouts
    pub fn task_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Whether anything is waiting for a tick
    pub fn has_pending(&self) -> bool {
        self.task_count() > 0
    }

    /// Timestamp of the most recent tick
    pub fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame
    }
}

enum Step {
    Frame(FrameCallback),
    Timeout(Box<dyn FnOnce()>),
}

/// A weak handle to the frame scheduler
///
/// This is what callbacks and long-lived components keep. It won't prevent
/// the scheduler from being dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    fn upgrade(&self) -> Option<FrameScheduler> {
        self.inner.upgrade().map(|inner| FrameScheduler { inner })
    }

    /// Register a frame callback; `None` if the scheduler is gone
    pub fn request_frame<F>(&self, callback: F) -> Option<FrameTask>
    where
        F: FnMut(&FrameInfo) -> FrameControl + 'static,
    {
        self.upgrade().map(|scheduler| scheduler.request_frame(callback))
    }

    /// Register a timeout; `None` if the scheduler is gone
    pub fn request_timeout<F>(&self, delay_ms: f64, callback: F) -> Option<FrameTask>
    where
        F: FnOnce() + 'static,
    {
        self.upgrade()
            .map(|scheduler| scheduler.request_timeout(delay_ms, callback))
    }

    fn cancel(&self, id: FrameTaskId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        // The callback may own other tasks; drop it after the borrow ends
        let removed = inner.borrow_mut().tasks.remove(id);
        removed.is_some()
    }

    fn contains(&self, id: FrameTaskId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().tasks.contains_key(id))
            .unwrap_or(false)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Owner of a scheduled callback
///
/// Dropping the task cancels it.
pub struct FrameTask {
    id: FrameTaskId,
    handle: SchedulerHandle,
}

impl FrameTask {
    fn new(id: FrameTaskId, handle: SchedulerHandle) -> Self {
        Self { id, handle }
    }

    pub fn id(&self) -> FrameTaskId {
        self.id
    }

    /// Deregister the callback; returns false if it had already finished
    pub fn cancel(&self) -> bool {
        self.handle.cancel(self.id)
    }

    /// Whether the callback is still registered
    pub fn is_active(&self) -> bool {
        self.handle.contains(self.id)
    }
}

impl Drop for FrameTask {
    fn drop(&mut self) {
        self.handle.cancel(self.id);
    }
}

impl std::fmt::Debug for FrameTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTask").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_frame_callback_runs_until_done() {
        let scheduler = FrameScheduler::new();
        let runs = Rc::new(Cell::new(0));
        let r = Rc::clone(&runs);
        let task = scheduler.request_frame(move |_| {
            r.set(r.get() + 1);
            if r.get() == 3 {
                FrameControl::Done
            } else {
                FrameControl::Continue
            }
        });

        for frame in 0..5 {
            scheduler.tick(frame as f64 * 16.0);
        }
        assert_eq!(runs.get(), 3);
        assert!(!task.is_active());
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_drop_cancels() {
        let scheduler = FrameScheduler::new();
        let runs = Rc::new(Cell::new(0));
        let r = Rc::clone(&runs);
        let task = scheduler.request_frame(move |_| {
            r.set(r.get() + 1);
            FrameControl::Continue
        });
        scheduler.tick(0.0);
        drop(task);
        scheduler.tick(16.0);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_cancel_from_inside_same_frame() {
        let scheduler = FrameScheduler::new();
        let victim_ran = Rc::new(Cell::new(false));
        let victim: Rc<RefCell<Option<FrameTask>>> = Rc::new(RefCell::new(None));

        let v = Rc::clone(&victim);
        let _killer = scheduler.request_frame(move |_| {
            if let Some(task) = v.borrow().as_ref() {
                task.cancel();
            }
            FrameControl::Continue
        });
        let ran = Rc::clone(&victim_ran);
        *victim.borrow_mut() = Some(scheduler.request_frame(move |_| {
            ran.set(true);
            FrameControl::Continue
        }));

        scheduler.tick(0.0);
        scheduler.tick(16.0);
        assert!(!victim_ran.get());
    }

    #[test]
    fn test_task_added_during_tick_waits_for_next_frame() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let inner_runs = Rc::new(Cell::new(0));
        let spawned: Rc<RefCell<Vec<FrameTask>>> = Rc::new(RefCell::new(Vec::new()));

        let runs = Rc::clone(&inner_runs);
        let store = Rc::clone(&spawned);
        let _outer = scheduler.request_frame(move |_| {
            let runs = Rc::clone(&runs);
            if let Some(task) = handle.request_frame(move |_| {
                runs.set(runs.get() + 1);
                FrameControl::Done
            }) {
                store.borrow_mut().push(task);
            }
            FrameControl::Done
        });

        scheduler.tick(0.0);
        assert_eq!(inner_runs.get(), 0);
        scheduler.tick(16.0);
        assert_eq!(inner_runs.get(), 1);
    }

    #[test]
    fn test_timeout_fires_once_when_due() {
        let scheduler = FrameScheduler::new();
        scheduler.tick(1000.0);
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        let _task = scheduler.request_timeout(100.0, move || f.set(f.get() + 1));

        scheduler.tick(1050.0);
        assert_eq!(fired.get(), 0);
        scheduler.tick(1100.0);
        scheduler.tick(1200.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_frame_info_delta() {
        let scheduler = FrameScheduler::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _task = scheduler.request_frame(move |info| {
            s.borrow_mut().push((info.frame, info.delta_ms));
            FrameControl::Continue
        });
        scheduler.tick(100.0);
        scheduler.tick(116.0);
        assert_eq!(*seen.borrow(), vec![(0, 0.0), (1, 16.0)]);
    }

    #[test]
    fn test_handle_outlives_scheduler() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let task = scheduler.request_frame(|_| FrameControl::Continue);
        drop(scheduler);
        assert!(!handle.is_alive());
        assert!(handle.request_frame(|_| FrameControl::Continue).is_none());
        assert!(!task.cancel());
    }
}
