//! Scroll reveal engine
//!
//! Binds elements to animation presets: the preset's `from` state is applied
//! at bind time and the tween to `to` plays once when the trigger element
//! reaches its start position.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use lumen_animation::FrameScheduler;
//! use lumen_core::{Document, EventDispatcher, Rect, Viewport};
//! use lumen_layout::{IntersectionObserver, RevealOptions, ScrollRevealEngine};
//!
//! let doc = Document::new(Viewport::default()).into_shared();
//! let scheduler = FrameScheduler::new();
//! let events = EventDispatcher::new();
//! let observer = IntersectionObserver::new(Rc::clone(&doc), &scheduler, &events);
//!
//! let card = {
//!     let mut d = doc.borrow_mut();
//!     let root = d.tree.root();
//!     let card = d.tree.append_element(root, "article").unwrap();
//!     d.tree.set_bounds(card, Rect::new(0.0, 200.0, 400.0, 300.0));
//!     card
//! };
//!
//! let engine = ScrollRevealEngine::new(Rc::clone(&doc), &scheduler, observer.handle());
//! let binding = engine.bind_named(&[card], "fadeInUp", RevealOptions::default()).unwrap();
//! assert_eq!(doc.borrow().tree.style(card).unwrap().opacity, 0.0);
//!
//! scheduler.tick(0.0);
//! assert!(engine.is_fired(binding));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use lumen_animation::{
    AnimationContext, AnimationPreset, FrameScheduler, Targets, TweenId, TweenOptions,
};
use lumen_core::{ElementId, SharedDocument};

use crate::error::RevealError;
use crate::intersection::{ObservationId, ObserverHandle};
use crate::trigger::TriggerStart;

new_key_type! {
    /// Handle to a reveal binding
    pub struct BindingId;
}

/// Delay between consecutive items of a section
pub const SECTION_ITEM_DELAY: f32 = 0.1;

/// When a binding fires
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerMode {
    /// On the next frame after binding
    Immediate,
    /// When the trigger element reaches the start position
    OnIntersect(TriggerStart),
}

impl Default for TriggerMode {
    fn default() -> Self {
        TriggerMode::OnIntersect(TriggerStart::DEFAULT)
    }
}

/// How often a binding may fire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FiringPolicy {
    /// Fire once; later triggers are ignored until `reset`
    #[default]
    PlayOnce,
}

/// Per-binding overrides of the preset
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RevealOptions {
    pub trigger: TriggerMode,
    /// Element whose position drives the trigger; defaults to the first target
    pub trigger_element: Option<ElementId>,
    pub stagger: Option<f32>,
    pub delay: Option<f32>,
    pub duration: Option<f32>,
    pub policy: FiringPolicy,
}

impl RevealOptions {
    pub fn immediate() -> Self {
        Self {
            trigger: TriggerMode::Immediate,
            ..Self::default()
        }
    }

    pub fn with_start(mut self, start: TriggerStart) -> Self {
        self.trigger = TriggerMode::OnIntersect(start);
        self
    }

    pub fn with_trigger_element(mut self, element: ElementId) -> Self {
        self.trigger_element = Some(element);
        self
    }

    pub fn with_stagger(mut self, seconds: f32) -> Self {
        self.stagger = Some(seconds);
        self
    }

    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = Some(seconds);
        self
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    fn tween_options(&self, preset: &AnimationPreset) -> TweenOptions {
        let base = preset.tween_options();
        TweenOptions {
            duration: self.duration.unwrap_or(base.duration),
            delay: self.delay.unwrap_or(base.delay),
            stagger: self.stagger.unwrap_or(base.stagger),
            ease: base.ease,
        }
    }
}

struct RevealBinding {
    targets: Targets,
    trigger_element: ElementId,
    preset: AnimationPreset,
    options: RevealOptions,
    fired: bool,
    observation: Option<ObservationId>,
    tween: Option<TweenId>,
}

struct EngineState {
    document: SharedDocument,
    ctx: AnimationContext,
    observer: ObserverHandle,
    bindings: SlotMap<BindingId, RevealBinding>,
}

/// Owner of a set of reveal bindings
pub struct ScrollRevealEngine {
    state: Rc<RefCell<EngineState>>,
}

impl ScrollRevealEngine {
    pub fn new(document: SharedDocument, scheduler: &FrameScheduler, observer: ObserverHandle) -> Self {
        let ctx = AnimationContext::new(Rc::clone(&document), scheduler);
        Self {
            state: Rc::new(RefCell::new(EngineState {
                document,
                ctx,
                observer,
                bindings: SlotMap::with_key(),
            })),
        }
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Bind `targets` to `preset`
    ///
    /// The `from` state is applied immediately, or the `to` state when the
    /// user prefers reduced motion (the binding then counts as fired).
    pub fn bind(
        &self,
        targets: &[ElementId],
        preset: &AnimationPreset,
        options: RevealOptions,
    ) -> Result<BindingId, RevealError> {
        let first = *targets.first().ok_or(RevealError::NoTargets)?;
        let reduced_motion = self.state.borrow().document.borrow().prefers_reduced_motion();

        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.bindings.insert(RevealBinding {
                targets: Targets::from_slice(targets),
                trigger_element: options.trigger_element.unwrap_or(first),
                preset: *preset,
                options,
                fired: reduced_motion,
                observation: None,
                tween: None,
            });
            if reduced_motion {
                state.ctx.set(targets, preset.from.merged(&preset.to));
            } else {
                state.ctx.set(targets, preset.from);
            }
            id
        };

        tracing::debug!(preset = preset.name, targets = targets.len(), reduced_motion, "reveal bound");
        if !reduced_motion {
            self.arm(id);
        }
        Ok(id)
    }

    /// Bind using a built-in preset name
    pub fn bind_named(
        &self,
        targets: &[ElementId],
        name: &str,
        options: RevealOptions,
    ) -> Result<BindingId, RevealError> {
        let preset = AnimationPreset::by_name(name)
            .ok_or_else(|| RevealError::UnknownPreset(name.to_string()))?;
        self.bind(targets, preset, options)
    }

    /// One trigger drives a staggered tween over every target
    ///
    /// The trigger is the first target's parent, or the first target itself
    /// when it has none.
    pub fn bind_batch(
        &self,
        targets: &[ElementId],
        preset: &AnimationPreset,
        stagger: f32,
    ) -> Result<BindingId, RevealError> {
        let first = *targets.first().ok_or(RevealError::NoTargets)?;
        let trigger = {
            let state = self.state.borrow();
            let document = state.document.borrow();
            document.tree.parent(first).unwrap_or(first)
        };
        self.bind(
            targets,
            preset,
            RevealOptions::default()
                .with_trigger_element(trigger)
                .with_stagger(stagger),
        )
    }

    /// Every target gets its own trigger and a delay of `index * 0.1s`
    pub fn bind_each(
        &self,
        targets: &[ElementId],
        preset: &AnimationPreset,
    ) -> Result<Vec<BindingId>, RevealError> {
        if targets.is_empty() {
            return Err(RevealError::NoTargets);
        }
        targets
            .iter()
            .enumerate()
            .map(|(index, &target)| {
                self.bind(
                    &[target],
                    preset,
                    RevealOptions::default().with_delay(index as f32 * SECTION_ITEM_DELAY),
                )
            })
            .collect()
    }

    fn arm(&self, id: BindingId) {
        let trigger = {
            let state = self.state.borrow();
            let Some(binding) = state.bindings.get(id) else {
                return;
            };
            (binding.options.trigger, binding.trigger_element)
        };

        match trigger {
            (TriggerMode::Immediate, _) => self.fire(id),
            (TriggerMode::OnIntersect(start), element) => {
                let weak = Rc::downgrade(&self.state);
                let observer = self.state.borrow().observer.clone();
                let observation = observer.observe(element, start, move |_| {
                    if let Some(state) = weak.upgrade() {
                        fire_binding(&state, id);
                    }
                });
                if let Some(binding) = self.state.borrow_mut().bindings.get_mut(id) {
                    binding.observation = observation;
                }
            }
        }
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Play the binding now; no-op if it already fired
    pub fn fire(&self, id: BindingId) {
        fire_binding(&self.state, id);
    }

    /// Re-apply `from` and re-arm the trigger
    pub fn reset(&self, id: BindingId) {
        let observation = {
            let mut state = self.state.borrow_mut();
            let EngineState { ctx, bindings, .. } = &mut *state;
            let Some(binding) = bindings.get_mut(id) else {
                return;
            };
            if let Some(tween) = binding.tween.take() {
                ctx.kill(tween);
            }
            ctx.set(&binding.targets, binding.preset.from);
            binding.fired = false;
            binding.observation.take()
        };
        if let Some(observation) = observation {
            self.state.borrow().observer.unobserve(observation);
        }
        self.arm(id);
    }

    /// Remove a binding, its observation and its tween
    pub fn unbind(&self, id: BindingId) -> bool {
        let removed = {
            let mut state = self.state.borrow_mut();
            let removed = state.bindings.remove(id);
            if let Some(binding) = removed.as_ref() {
                if let Some(tween) = binding.tween {
                    state.ctx.kill(tween);
                }
                state.ctx.forget(&binding.targets);
            }
            removed
        };
        let Some(binding) = removed else {
            return false;
        };
        if let Some(observation) = binding.observation {
            self.state.borrow().observer.unobserve(observation);
        }
        true
    }

    /// Remove every binding
    pub fn teardown(&self) {
        let ids: Vec<BindingId> = self.state.borrow().bindings.keys().collect();
        for id in ids {
            self.unbind(id);
        }
        self.state.borrow().ctx.kill_all();
    }

    pub fn is_fired(&self, id: BindingId) -> bool {
        self.state
            .borrow()
            .bindings
            .get(id)
            .map(|b| b.fired)
            .unwrap_or(false)
    }

    pub fn binding_count(&self) -> usize {
        self.state.borrow().bindings.len()
    }

    /// Number of bindings that have fired
    pub fn fired_count(&self) -> usize {
        self.state
            .borrow()
            .bindings
            .values()
            .filter(|b| b.fired)
            .count()
    }

    /// Number of reveal tweens still running
    pub fn active_tweens(&self) -> usize {
        self.state.borrow().ctx.active_count()
    }
}

impl Drop for ScrollRevealEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn fire_binding(state: &Rc<RefCell<EngineState>>, id: BindingId) {
    let observation = {
        let mut guard = state.borrow_mut();
        let EngineState {
            document,
            ctx,
            bindings,
            ..
        } = &mut *guard;
        let Some(binding) = bindings.get_mut(id) else {
            return;
        };
        if binding.fired {
            return;
        }
        binding.fired = true;

        let live: Targets = {
            let document = document.borrow();
            binding
                .targets
                .iter()
                .copied()
                .filter(|&t| document.tree.contains(t))
                .collect()
        };
        if live.is_empty() {
            tracing::trace!(?id, "reveal targets are gone, nothing to play");
        } else {
            let options = binding.options.tween_options(&binding.preset);
            binding.tween = Some(ctx.from_to(&live, binding.preset.from, binding.preset.to, options));
            tracing::debug!(preset = binding.preset.name, targets = live.len(), "reveal fired");
        }
        binding.observation.take()
    };

    if let Some(observation) = observation {
        state.borrow().observer.unobserve(observation);
    }
}
