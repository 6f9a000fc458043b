//! Animation context
//!
//! An `AnimationContext` owns every tween a component creates. It replaces a
//! process-wide tweening engine: there is no global registry, each component
//! holds its own context and dropping it (or calling `kill_all`) stops
//! everything it started. `revert` additionally restores the styles the
//! targets had before the context first touched them.
//!
//! Tweens advance from a single frame task that exists only while at least
//! one tween is running.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use lumen_core::{Document, ElementId, SharedDocument, Style};

use crate::scheduler::{FrameControl, FrameInfo, FrameScheduler, FrameTask, SchedulerHandle};
use crate::tween::{Targets, Tween, TweenOptions};
use crate::values::StyleProps;

new_key_type! {
    /// Handle to a tween owned by an `AnimationContext`
    pub struct TweenId;
}

#[derive(Default)]
struct ContextInner {
    tweens: SlotMap<TweenId, Tween>,
    /// Style of each target before this context first modified it
    captured: FxHashMap<ElementId, Style>,
    task: Option<FrameTask>,
}

impl ContextInner {
    /// Drop captured styles of elements that left the tree
    fn prune(&mut self, document: &Document) {
        self.captured.retain(|&target, _| document.tree.contains(target));
    }
}

/// Owner of a component's tweens
pub struct AnimationContext {
    document: SharedDocument,
    scheduler: SchedulerHandle,
    inner: Rc<RefCell<ContextInner>>,
}

impl AnimationContext {
    pub fn new(document: SharedDocument, scheduler: &FrameScheduler) -> Self {
        Self::with_handle(document, scheduler.handle())
    }

    pub fn with_handle(document: SharedDocument, scheduler: SchedulerHandle) -> Self {
        Self {
            document,
            scheduler,
            inner: Rc::new(RefCell::new(ContextInner::default())),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    // =========================================================================
    // Tween creation
    // =========================================================================

    /// Apply `props` to every target immediately
    pub fn set(&self, targets: &[ElementId], props: StyleProps) {
        let mut inner = self.inner.borrow_mut();
        let mut document = self.document.borrow_mut();
        inner.prune(&document);
        for &target in targets {
            let Some(style) = document.tree.style_mut(target) else {
                continue;
            };
            inner.captured.entry(target).or_insert(*style);
            props.apply_to(style);
        }
    }

    /// Apply `from` now, then tween to `to`
    pub fn from_to(
        &self,
        targets: &[ElementId],
        from: StyleProps,
        to: StyleProps,
        options: TweenOptions,
    ) -> TweenId {
        self.set(targets, from);
        self.insert(Tween::new(Targets::from_slice(targets), from, to, options))
    }

    /// Tween from the targets' current style to `to`
    pub fn to(&self, targets: &[ElementId], to: StyleProps, options: TweenOptions) -> TweenId {
        self.capture(targets);
        self.insert(Tween::new(
            Targets::from_slice(targets),
            StyleProps::NONE,
            to,
            options,
        ))
    }

    /// Jump to `from` now and tween back to each target's current style
    pub fn from(&self, targets: &[ElementId], from: StyleProps, options: TweenOptions) -> Vec<TweenId> {
        // Each target may rest at a different style, so each gets its own tween
        let resting: Vec<(ElementId, StyleProps)> = {
            let document = self.document.borrow();
            targets
                .iter()
                .filter_map(|&t| document.tree.style(t).map(|style| (t, from.capture(style))))
                .collect()
        };
        self.set(targets, from);
        resting
            .into_iter()
            .enumerate()
            .map(|(index, (target, to))| {
                let options = options.with_delay(options.delay + index as f32 * options.stagger);
                self.insert(Tween::new(
                    Targets::from_slice(&[target]),
                    from,
                    to,
                    options.with_stagger(0.0),
                ))
            })
            .collect()
    }

    /// Run `callback` once the tween completes; dropped if it is killed first
    pub fn on_complete<F>(&self, id: TweenId, callback: F) -> bool
    where
        F: FnOnce() + 'static,
    {
        match self.inner.borrow_mut().tweens.get_mut(id) {
            Some(tween) => {
                tween.set_on_complete(Box::new(callback));
                true
            }
            None => false,
        }
    }

    fn capture(&self, targets: &[ElementId]) {
        let mut inner = self.inner.borrow_mut();
        let document = self.document.borrow();
        inner.prune(&document);
        for &target in targets {
            if let Some(style) = document.tree.style(target) {
                inner.captured.entry(target).or_insert(*style);
            }
        }
    }

    fn insert(&self, tween: Tween) -> TweenId {
        let id = self.inner.borrow_mut().tweens.insert(tween);
        self.ensure_running();
        id
    }

    fn ensure_running(&self) {
        let running = self
            .inner
            .borrow()
            .task
            .as_ref()
            .map(FrameTask::is_active)
            .unwrap_or(false);
        if running {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let document = Rc::clone(&self.document);
        let task = self
            .scheduler
            .request_frame(move |info| advance(&weak, &document, info));
        if task.is_none() {
            tracing::warn!("frame scheduler is gone; tweens will not advance");
        }
        self.inner.borrow_mut().task = task;
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Stop a tween where it is
    pub fn kill(&self, id: TweenId) -> bool {
        let removed = self.inner.borrow_mut().tweens.remove(id);
        self.prune_captured();
        removed.is_some()
    }

    /// Stop every tween of this context
    pub fn kill_all(&self) {
        let (tweens, task) = {
            let mut inner = self.inner.borrow_mut();
            (std::mem::take(&mut inner.tweens), inner.task.take())
        };
        drop(tweens);
        drop(task);
        self.prune_captured();
    }

    /// Stop tracking `targets`; `revert` will leave them as they are
    ///
    /// Call this before removing elements this context has touched.
    pub fn forget(&self, targets: &[ElementId]) {
        let mut inner = self.inner.borrow_mut();
        for target in targets {
            inner.captured.remove(target);
        }
    }

    fn prune_captured(&self) {
        // Skipped while the document is mutably borrowed higher up the stack
        if let Ok(document) = self.document.try_borrow() {
            self.inner.borrow_mut().prune(&document);
        }
    }

    /// Jump every running tween to its end state and stop it
    pub fn finish_all(&self) {
        let mut completions = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let mut document = self.document.borrow_mut();
            for (_, tween) in inner.tweens.iter_mut() {
                tween.finish(&mut document);
                completions.extend(tween.take_on_complete());
            }
        }
        self.kill_all();
        for callback in completions {
            callback();
        }
    }

    /// Kill everything and restore the captured styles
    pub fn revert(&self) {
        self.kill_all();
        let captured = std::mem::take(&mut self.inner.borrow_mut().captured);
        let mut document = self.document.borrow_mut();
        for (target, style) in captured {
            if let Some(current) = document.tree.style_mut(target) {
                *current = style;
            }
        }
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.inner.borrow().tweens.contains_key(id)
    }

    /// Number of tweens still running
    pub fn active_count(&self) -> usize {
        self.inner.borrow().tweens.len()
    }

    /// Number of targets whose original style is held for `revert`
    pub fn captured_count(&self) -> usize {
        self.inner.borrow().captured.len()
    }
}

impl Drop for AnimationContext {
    fn drop(&mut self) {
        self.kill_all();
    }
}

/// Frame callback shared by every tween of one context
fn advance(inner: &Weak<RefCell<ContextInner>>, document: &SharedDocument, info: &FrameInfo) -> FrameControl {
    let Some(inner) = inner.upgrade() else {
        return FrameControl::Done;
    };
    let Ok(mut doc) = document.try_borrow_mut() else {
        tracing::trace!("document busy, deferring tween frame");
        return FrameControl::Continue;
    };

    let mut completions = Vec::new();
    let control = {
        let mut state = inner.borrow_mut();
        let finished: Vec<TweenId> = state
            .tweens
            .iter_mut()
            .filter_map(|(id, tween)| tween.step(&mut doc, info.timestamp_ms).then_some(id))
            .collect();
        for id in finished {
            if let Some(mut tween) = state.tweens.remove(id) {
                completions.extend(tween.take_on_complete());
            }
        }
        if state.tweens.is_empty() {
            state.task = None;
            FrameControl::Done
        } else {
            FrameControl::Continue
        }
    };
    drop(doc);

    for callback in completions {
        callback();
    }
    control
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use lumen_core::{Document, Viewport};
    use std::cell::Cell;

    fn setup(count: usize) -> (SharedDocument, FrameScheduler, Vec<ElementId>) {
        let mut doc = Document::new(Viewport::default());
        let root = doc.tree.root();
        let targets = (0..count)
            .map(|_| doc.tree.append_element(root, "div").unwrap())
            .collect();
        (doc.into_shared(), FrameScheduler::new(), targets)
    }

    fn linear(duration: f32) -> TweenOptions {
        TweenOptions::default()
            .with_duration(duration)
            .with_ease(Easing::Linear)
    }

    #[test]
    fn test_from_to_applies_from_immediately() {
        let (doc, scheduler, targets) = setup(2);
        let ctx = AnimationContext::new(Rc::clone(&doc), &scheduler);
        ctx.from_to(
            &targets,
            StyleProps::new().opacity(0.0).y(60.0),
            StyleProps::new().opacity(1.0).y(0.0),
            linear(0.5),
        );
        assert_eq!(doc.borrow().tree.style(targets[1]).unwrap().opacity, 0.0);
        assert_eq!(scheduler.task_count(), 1);

        scheduler.tick(0.0);
        scheduler.tick(600.0);
        let style = *doc.borrow().tree.style(targets[1]).unwrap();
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.translate_y, 0.0);
        assert_eq!(ctx.active_count(), 0);
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_on_complete_runs_after_last_frame() {
        let (doc, scheduler, targets) = setup(1);
        let ctx = AnimationContext::new(doc, &scheduler);
        let done = Rc::new(Cell::new(0));
        let d = Rc::clone(&done);
        let id = ctx.to(&targets, StyleProps::new().scale(2.0), linear(0.2));
        assert!(ctx.on_complete(id, move || d.set(d.get() + 1)));

        scheduler.tick(0.0);
        assert_eq!(done.get(), 0);
        scheduler.tick(250.0);
        scheduler.tick(500.0);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_drop_kills_tweens() {
        let (doc, scheduler, targets) = setup(1);
        let ctx = AnimationContext::new(Rc::clone(&doc), &scheduler);
        ctx.from_to(
            &targets,
            StyleProps::new().opacity(0.0),
            StyleProps::new().opacity(1.0),
            linear(1.0),
        );
        scheduler.tick(0.0);
        drop(ctx);
        assert_eq!(scheduler.task_count(), 0);
        scheduler.tick(2000.0);
        assert_eq!(doc.borrow().tree.style(targets[0]).unwrap().opacity, 0.0);
    }

    #[test]
    fn test_revert_restores_original_styles() {
        let (doc, scheduler, targets) = setup(1);
        let ctx = AnimationContext::new(Rc::clone(&doc), &scheduler);
        ctx.set(&targets, StyleProps::new().opacity(0.0).x(-60.0));
        ctx.set(&targets, StyleProps::new().opacity(0.5));
        ctx.revert();
        let style = *doc.borrow().tree.style(targets[0]).unwrap();
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.translate_x, 0.0);
    }

    #[test]
    fn test_from_returns_to_resting_style() {
        let (doc, scheduler, targets) = setup(2);
        doc.borrow_mut().tree.style_mut(targets[1]).unwrap().opacity = 0.8;
        let ctx = AnimationContext::new(Rc::clone(&doc), &scheduler);
        let ids = ctx.from(&targets, StyleProps::new().opacity(0.0), linear(0.1).with_stagger(0.05));
        assert_eq!(ids.len(), 2);
        assert_eq!(doc.borrow().tree.style(targets[1]).unwrap().opacity, 0.0);

        scheduler.tick(0.0);
        scheduler.tick(500.0);
        assert_eq!(doc.borrow().tree.style(targets[0]).unwrap().opacity, 1.0);
        assert!((doc.borrow().tree.style(targets[1]).unwrap().opacity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_kill_single_tween() {
        let (doc, scheduler, targets) = setup(2);
        let ctx = AnimationContext::new(doc, &scheduler);
        let a = ctx.to(&targets[..1], StyleProps::new().y(10.0), linear(1.0));
        let b = ctx.to(&targets[1..], StyleProps::new().y(10.0), linear(1.0));
        assert!(ctx.kill(a));
        assert!(!ctx.is_active(a));
        assert!(ctx.is_active(b));
        assert_eq!(ctx.active_count(), 1);
    }

    #[test]
    fn test_removed_targets_are_not_retained() {
        let (doc, scheduler, _) = setup(0);
        let ctx = AnimationContext::new(Rc::clone(&doc), &scheduler);
        for _ in 0..1000 {
            let span = {
                let mut d = doc.borrow_mut();
                let root = d.tree.root();
                d.tree.append_element(root, "span").unwrap()
            };
            let id = ctx.from_to(
                &[span],
                StyleProps::new().opacity(0.0),
                StyleProps::new().opacity(1.0),
                linear(0.5),
            );
            ctx.kill(id);
            doc.borrow_mut().tree.remove(span);
        }
        // The last span was removed after its kill; the next sweep drops it
        assert!(ctx.captured_count() <= 1);
        ctx.kill_all();
        assert_eq!(ctx.captured_count(), 0);
    }

    #[test]
    fn test_forget_skips_revert() {
        let (doc, scheduler, targets) = setup(2);
        let ctx = AnimationContext::new(Rc::clone(&doc), &scheduler);
        ctx.set(&targets, StyleProps::new().opacity(0.0));
        assert_eq!(ctx.captured_count(), 2);

        ctx.forget(&targets[..1]);
        assert_eq!(ctx.captured_count(), 1);
        ctx.revert();
        assert_eq!(doc.borrow().tree.style(targets[0]).unwrap().opacity, 0.0);
        assert_eq!(doc.borrow().tree.style(targets[1]).unwrap().opacity, 1.0);
        assert_eq!(ctx.captured_count(), 0);
    }
}
