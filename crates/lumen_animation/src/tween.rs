//! Tweens
//!
//! A tween drives an ordered list of targets from a start state to `to`.
//! Target `i` begins `delay + i * stagger` seconds after the tween starts.
//! Targets that have been removed from the document are skipped, so a tween
//! whose elements unmount mid-flight simply finishes without effect.

use smallvec::SmallVec;

use lumen_core::{Document, ElementId};

use crate::easing::Easing;
use crate::presets::{DEFAULT_DURATION, DEFAULT_EASE};
use crate::values::{Interpolate, StyleProps};

/// Ordered tween targets
pub type Targets = SmallVec<[ElementId; 8]>;

/// Timing of a tween, all values in seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenOptions {
    pub duration: f32,
    pub delay: f32,
    /// Extra start offset per target index
    pub stagger: f32,
    pub ease: Easing,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            delay: 0.0,
            stagger: 0.0,
            ease: DEFAULT_EASE,
        }
    }
}

impl TweenOptions {
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn with_stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds;
        self
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    /// Seconds from start until the last target settles
    pub fn total_duration(&self, target_count: usize) -> f32 {
        let last = target_count.saturating_sub(1) as f32;
        self.delay + last * self.stagger + self.duration.max(0.0)
    }

    /// Linear progress of target `index` at `elapsed` seconds, or `None`
    /// before that target has started
    pub fn local_progress(&self, index: usize, elapsed: f32) -> Option<f32> {
        let local = elapsed - self.delay - index as f32 * self.stagger;
        if local < 0.0 {
            return None;
        }
        if self.duration <= 0.0 {
            return Some(1.0);
        }
        Some((local / self.duration).min(1.0))
    }
}

/// A single tween over one or more targets
pub struct Tween {
    targets: Targets,
    /// Explicit start values; missing fields start from the element's
    /// current style
    from: StyleProps,
    to: StyleProps,
    options: TweenOptions,
    starts: Vec<StyleProps>,
    start_ms: Option<f64>,
    finished: bool,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Tween {
    pub fn new(targets: Targets, from: StyleProps, to: StyleProps, options: TweenOptions) -> Self {
        Self {
            targets,
            from,
            to,
            options,
            starts: Vec::new(),
            start_ms: None,
            finished: false,
            on_complete: None,
        }
    }

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    pub fn options(&self) -> &TweenOptions {
        &self.options
    }

    pub fn to(&self) -> &StyleProps {
        &self.to
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the first frame has been rendered
    pub fn has_started(&self) -> bool {
        self.start_ms.is_some()
    }

    pub fn set_on_complete(&mut self, callback: Box<dyn FnOnce()>) {
        self.on_complete = Some(callback);
    }

    pub fn take_on_complete(&mut self) -> Option<Box<dyn FnOnce()>> {
        self.on_complete.take()
    }

    fn resolve_starts(&mut self, document: &Document) {
        let template = self.to.merged(&self.from);
        self.starts = self
            .targets
            .iter()
            .map(|&target| {
                let current = document
                    .tree
                    .style(target)
                    .map(|style| template.capture(style))
                    .unwrap_or(template);
                current.merged(&self.from)
            })
            .collect();
    }

    /// Render the frame at `timestamp_ms`; returns true once every target
    /// has settled
    pub fn step(&mut self, document: &mut Document, timestamp_ms: f64) -> bool {
        if self.finished {
            return true;
        }
        let start_ms = match self.start_ms {
            Some(start) => start,
            None => {
                self.resolve_starts(document);
                self.start_ms = Some(timestamp_ms);
                timestamp_ms
            }
        };

        let elapsed = ((timestamp_ms - start_ms) / 1000.0) as f32;
        for (index, &target) in self.targets.iter().enumerate() {
            let Some(progress) = self.options.local_progress(index, elapsed) else {
                continue;
            };
            let Some(style) = document.tree.style_mut(target) else {
                continue;
            };
            let eased = self.options.ease.apply(progress);
            self.starts[index].lerp(&self.to, eased).apply_to(style);
        }

        self.finished = elapsed >= self.options.total_duration(self.targets.len());
        self.finished
    }

    /// Jump every live target to the end state
    pub fn finish(&mut self, document: &mut Document) {
        for &target in &self.targets {
            if let Some(style) = document.tree.style_mut(target) {
                self.to.apply_to(style);
            }
        }
        self.finished = true;
    }
}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("targets", &self.targets.len())
            .field("options", &self.options)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Viewport;
    use smallvec::smallvec;

    fn document_with_items(count: usize) -> (Document, Targets) {
        let mut doc = Document::new(Viewport::default());
        let root = doc.tree.root();
        let targets = (0..count)
            .map(|_| doc.tree.append_element(root, "li").unwrap())
            .collect();
        (doc, targets)
    }

    #[test]
    fn test_stagger_offsets() {
        let options = TweenOptions::default()
            .with_duration(1.0)
            .with_stagger(0.1)
            .with_ease(Easing::Linear);
        assert_eq!(options.local_progress(0, 0.0), Some(0.0));
        assert_eq!(options.local_progress(3, 0.25), None);
        let p = options.local_progress(3, 0.8).unwrap();
        assert!((p - 0.5).abs() < 1e-6);
        assert!((options.total_duration(4) - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_step_interpolates_and_finishes() {
        let (mut doc, targets) = document_with_items(1);
        let mut tween = Tween::new(
            targets.clone(),
            StyleProps::new().opacity(0.0),
            StyleProps::new().opacity(1.0),
            TweenOptions::default()
                .with_duration(1.0)
                .with_ease(Easing::Linear),
        );

        assert!(!tween.step(&mut doc, 1000.0));
        assert_eq!(doc.tree.style(targets[0]).unwrap().opacity, 0.0);
        assert!(!tween.step(&mut doc, 1500.0));
        assert!((doc.tree.style(targets[0]).unwrap().opacity - 0.5).abs() < 1e-6);
        assert!(tween.step(&mut doc, 2000.0));
        assert_eq!(doc.tree.style(targets[0]).unwrap().opacity, 1.0);
    }

    #[test]
    fn test_to_starts_from_current_style() {
        let (mut doc, targets) = document_with_items(1);
        doc.tree.style_mut(targets[0]).unwrap().translate_y = 40.0;
        let mut tween = Tween::new(
            targets.clone(),
            StyleProps::NONE,
            StyleProps::new().y(0.0),
            TweenOptions::default()
                .with_duration(1.0)
                .with_ease(Easing::Linear),
        );
        tween.step(&mut doc, 0.0);
        tween.step(&mut doc, 250.0);
        assert!((doc.tree.style(targets[0]).unwrap().translate_y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_removed_target_is_skipped() {
        let (mut doc, targets) = document_with_items(2);
        doc.tree.remove(targets[0]);
        let mut tween = Tween::new(
            targets.clone(),
            StyleProps::new().opacity(0.0),
            StyleProps::new().opacity(1.0),
            TweenOptions::default().with_duration(0.5),
        );
        tween.step(&mut doc, 0.0);
        assert!(tween.step(&mut doc, 600.0));
        assert_eq!(doc.tree.style(targets[1]).unwrap().opacity, 1.0);
    }

    #[test]
    fn test_zero_duration_settles_on_first_frame() {
        let (mut doc, targets) = document_with_items(1);
        let mut tween = Tween::new(
            smallvec![targets[0]],
            StyleProps::NONE,
            StyleProps::new().scale(1.02),
            TweenOptions::default().with_duration(0.0),
        );
        assert!(tween.step(&mut doc, 0.0));
        assert_eq!(doc.tree.style(targets[0]).unwrap().scale, 1.02);
    }
}
