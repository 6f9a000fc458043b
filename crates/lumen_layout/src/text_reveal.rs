//! Text split reveal
//!
//! Splits an element's text into units and reveals them with a staggered
//! tween, either when the element scrolls into view or right away.
//!
//! The component never leaves text hidden: with reduced motion, an empty
//! split or a split that fails, the element is simply shown.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use lumen_animation::{
    AnimationContext, Easing, FrameScheduler, StyleProps, TweenId, TweenOptions, DEFAULT_DURATION,
    DEFAULT_EASE,
};
use lumen_core::{Display, ElementId, Overflow, SharedDocument};

use crate::intersection::{ObservationId, ObserverHandle};
use crate::text_measure::{FixedAdvanceMeasure, TextMeasure};
use crate::text_split::{split_text, SplitType, TextSplit};
use crate::trigger::TriggerStart;

/// Motion applied to each unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealVariant {
    /// Fade in while rising 30 units
    #[default]
    FadeUp,
    FadeIn,
    /// Rise from one unit-height below, clipped by the word box for chars
    Reveal,
    /// Fade in while rising one unit-height
    SlideUp,
}

impl RevealVariant {
    /// Start and end props for the variant
    pub fn props(&self) -> (StyleProps, StyleProps) {
        match self {
            RevealVariant::FadeUp => (
                StyleProps::new().opacity(0.0).y(30.0),
                StyleProps::new().opacity(1.0).y(0.0),
            ),
            RevealVariant::FadeIn => (StyleProps::new().opacity(0.0), StyleProps::new().opacity(1.0)),
            RevealVariant::Reveal => (StyleProps::new().y_percent(100.0), StyleProps::new().y_percent(0.0)),
            RevealVariant::SlideUp => (
                StyleProps::new().opacity(0.0).y_percent(100.0),
                StyleProps::new().opacity(1.0).y_percent(0.0),
            ),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RevealVariant::FadeUp => "fadeUp",
            RevealVariant::FadeIn => "fadeIn",
            RevealVariant::Reveal => "reveal",
            RevealVariant::SlideUp => "slideUp",
        }
    }
}

impl FromStr for RevealVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fadeUp" => Ok(RevealVariant::FadeUp),
            "fadeIn" => Ok(RevealVariant::FadeIn),
            "reveal" => Ok(RevealVariant::Reveal),
            "slideUp" => Ok(RevealVariant::SlideUp),
            other => Err(format!("unknown reveal variant: {other}")),
        }
    }
}

impl fmt::Display for RevealVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for a `TextSplitReveal`
#[derive(Clone)]
pub struct TextRevealOptions {
    pub split: SplitType,
    pub variant: RevealVariant,
    /// Seconds between consecutive units
    pub stagger: f32,
    pub duration: f32,
    pub delay: f32,
    pub ease: Easing,
    /// Wait for the element to scroll into view; otherwise play on mount
    pub trigger: bool,
    pub trigger_start: TriggerStart,
    pub on_complete: Option<Rc<dyn Fn()>>,
}

impl Default for TextRevealOptions {
    fn default() -> Self {
        Self {
            split: SplitType::Words,
            variant: RevealVariant::FadeUp,
            stagger: 0.02,
            duration: DEFAULT_DURATION,
            delay: 0.0,
            ease: DEFAULT_EASE,
            trigger: true,
            trigger_start: TriggerStart::DEFAULT,
            on_complete: None,
        }
    }
}

impl fmt::Debug for TextRevealOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextRevealOptions")
            .field("split", &self.split)
            .field("variant", &self.variant)
            .field("stagger", &self.stagger)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("ease", &self.ease)
            .field("trigger", &self.trigger)
            .field("trigger_start", &self.trigger_start)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl TextRevealOptions {
    pub fn with_split(mut self, split: SplitType) -> Self {
        self.split = split;
        self
    }

    pub fn with_variant(mut self, variant: RevealVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds;
        self
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    /// Play on mount instead of on scroll
    pub fn untriggered(mut self) -> Self {
        self.trigger = false;
        self
    }

    pub fn with_trigger_start(mut self, start: TriggerStart) -> Self {
        self.trigger_start = start;
        self
    }

    pub fn on_complete<F: Fn() + 'static>(mut self, callback: F) -> Self {
        self.on_complete = Some(Rc::new(callback));
        self
    }

    fn tween_options(&self) -> TweenOptions {
        TweenOptions {
            duration: self.duration,
            delay: self.delay,
            stagger: self.stagger,
            ease: self.ease,
        }
    }
}

struct RevealState {
    document: SharedDocument,
    ctx: AnimationContext,
    observer: ObserverHandle,
    element: ElementId,
    options: TextRevealOptions,
    measure: Rc<dyn TextMeasure>,
    split: Option<TextSplit>,
    units: Vec<ElementId>,
    observation: Option<ObservationId>,
    tween: Option<TweenId>,
}

/// A mounted text reveal
pub struct TextSplitReveal {
    state: Rc<RefCell<RevealState>>,
}

impl TextSplitReveal {
    /// Mount with the fixed-advance text estimate
    pub fn mount(
        document: SharedDocument,
        scheduler: &FrameScheduler,
        observer: &ObserverHandle,
        element: ElementId,
        options: TextRevealOptions,
    ) -> Self {
        Self::mount_with_measurer(
            document,
            scheduler,
            observer,
            element,
            options,
            Rc::new(FixedAdvanceMeasure::default()),
        )
    }

    pub fn mount_with_measurer(
        document: SharedDocument,
        scheduler: &FrameScheduler,
        observer: &ObserverHandle,
        element: ElementId,
        options: TextRevealOptions,
        measure: Rc<dyn TextMeasure>,
    ) -> Self {
        let ctx = AnimationContext::new(Rc::clone(&document), scheduler);
        let state = Rc::new(RefCell::new(RevealState {
            document,
            ctx,
            observer: observer.clone(),
            element,
            options,
            measure,
            split: None,
            units: Vec::new(),
            observation: None,
            tween: None,
        }));
        setup(&state);
        Self { state }
    }

    /// Replace the options and rebuild the split
    pub fn update(&self, options: TextRevealOptions) {
        teardown(&self.state);
        self.state.borrow_mut().options = options;
        setup(&self.state);
    }

    /// Replace the element's text and rebuild the split
    pub fn set_text(&self, text: &str) {
        teardown(&self.state);
        {
            let state = self.state.borrow();
            let mut document = state.document.borrow_mut();
            if let Err(err) = document.tree.set_text(state.element, text) {
                tracing::warn!(%err, "could not replace reveal text");
            }
        }
        setup(&self.state);
    }

    /// Kill the tween, stop observing and restore the original text
    pub fn unmount(&self) {
        teardown(&self.state);
    }

    pub fn element(&self) -> ElementId {
        self.state.borrow().element
    }

    /// Units being animated, empty when the text is shown without motion
    pub fn units(&self) -> Vec<ElementId> {
        self.state.borrow().units.clone()
    }

    pub fn is_split(&self) -> bool {
        self.state
            .borrow()
            .split
            .as_ref()
            .map(|s| !s.is_reverted())
            .unwrap_or(false)
    }

    /// The tween has started (it may also have finished)
    pub fn has_played(&self) -> bool {
        self.state.borrow().tween.is_some()
    }

    pub fn is_animating(&self) -> bool {
        let state = self.state.borrow();
        state.tween.map(|t| state.ctx.is_active(t)).unwrap_or(false)
    }
}

impl Drop for TextSplitReveal {
    fn drop(&mut self) {
        teardown(&self.state);
    }
}

fn show(document: &SharedDocument, element: ElementId) {
    if let Some(style) = document.borrow_mut().tree.style_mut(element) {
        style.opacity = 1.0;
    }
}

fn setup(state: &Rc<RefCell<RevealState>>) {
    let (document, element, options, measure) = {
        let s = state.borrow();
        (
            Rc::clone(&s.document),
            s.element,
            s.options.clone(),
            Rc::clone(&s.measure),
        )
    };

    {
        let mut doc = document.borrow_mut();
        doc.tree.add_class(element, "text-reveal");
        doc.tree
            .add_class(element, &format!("text-reveal--{}", options.variant.name()));
    }

    if document.borrow().prefers_reduced_motion() {
        show(&document, element);
        return;
    }

    let result = {
        let mut doc = document.borrow_mut();
        split_text(&mut doc, element, options.split.into(), &*measure)
    };
    let split = match result {
        Ok(split) => split,
        Err(err) => {
            tracing::warn!(%err, ?element, "text split failed, showing text without motion");
            show(&document, element);
            return;
        }
    };

    let units = split.units(options.split).to_vec();
    if units.is_empty() {
        show(&document, element);
        state.borrow_mut().split = Some(split);
        return;
    }

    if options.variant == RevealVariant::Reveal && options.split == SplitType::Chars {
        let mut doc = document.borrow_mut();
        for &word in split.words() {
            if let Some(style) = doc.tree.style_mut(word) {
                style.overflow = Overflow::Hidden;
                style.display = Display::InlineBlock;
            }
        }
    }

    let (from, _) = options.variant.props();
    {
        let mut s = state.borrow_mut();
        s.ctx.set(&units, from);
        s.split = Some(split);
        s.units = units;
    }
    tracing::debug!(?element, variant = %options.variant, trigger = options.trigger, "text reveal mounted");

    if options.trigger {
        let weak = Rc::downgrade(state);
        let observer = state.borrow().observer.clone();
        let observation = observer.observe(element, options.trigger_start, move |_| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().observation = None;
                play(&state);
            }
        });
        state.borrow_mut().observation = observation;
    } else {
        play(state);
    }
}

fn play(state: &Rc<RefCell<RevealState>>) {
    let mut s = state.borrow_mut();
    if s.tween.is_some() || s.units.is_empty() {
        return;
    }
    let (_, to) = s.options.variant.props();
    let id = s.ctx.to(&s.units, to, s.options.tween_options());
    if let Some(callback) = s.options.on_complete.clone() {
        s.ctx.on_complete(id, move || callback());
    }
    s.tween = Some(id);
}

fn teardown(state: &Rc<RefCell<RevealState>>) {
    let (observation, split, observer, document) = {
        let mut s = state.borrow_mut();
        if let Some(tween) = s.tween.take() {
            s.ctx.kill(tween);
        }
        // Units are removed when the split reverts
        let units = std::mem::take(&mut s.units);
        s.ctx.forget(&units);
        (
            s.observation.take(),
            s.split.take(),
            s.observer.clone(),
            Rc::clone(&s.document),
        )
    };
    if let Some(observation) = observation {
        observer.unobserve(observation);
    }
    if let Some(mut split) = split {
        split.revert(&mut document.borrow_mut());
        tracing::debug!(element = ?split.element(), "text reveal unmounted");
    }
}

// ============================================================================
// Split animation helper
// ============================================================================

/// Options for `animate_split_text`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitAnimationOptions {
    pub duration: f32,
    pub ease: Easing,
    /// Stagger between chars; words use 3x and lines 5x
    pub stagger: f32,
    /// Starting vertical offset
    pub y: f32,
    /// Starting opacity
    pub opacity: f32,
}

impl Default for SplitAnimationOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            ease: DEFAULT_EASE,
            stagger: 0.02,
            y: 40.0,
            opacity: 0.0,
        }
    }
}

/// Animate the finest units of `split` in from an offset
///
/// Chars are preferred, then words, then lines.
pub fn animate_split_text(
    ctx: &AnimationContext,
    split: &TextSplit,
    options: SplitAnimationOptions,
) -> Vec<TweenId> {
    let (units, factor) = if !split.chars().is_empty() {
        (split.chars(), 1.0)
    } else if !split.words().is_empty() {
        (split.words(), 3.0)
    } else {
        (split.lines(), 5.0)
    };
    let from = StyleProps::new().y(options.y).opacity(options.opacity);
    let tween = TweenOptions {
        duration: options.duration,
        delay: 0.0,
        stagger: options.stagger * factor,
        ease: options.ease,
    };
    ctx.from(units, from, tween)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersection::IntersectionObserver;
    use crate::text_split::SplitTypes;
    use lumen_core::{Document, EventDispatcher, Rect, Viewport};
    use std::cell::Cell;

    struct Page {
        doc: SharedDocument,
        scheduler: FrameScheduler,
        _events: EventDispatcher,
        observer: IntersectionObserver,
        heading: ElementId,
    }

    fn page(text: &str, reduced_motion: bool) -> Page {
        let mut doc = Document::new(Viewport::default());
        doc.preferences.reduced_motion = reduced_motion;
        let root = doc.tree.root();
        let heading = doc.tree.append_element(root, "h2").unwrap();
        doc.tree.append_text(heading, text).unwrap();
        doc.tree.set_bounds(heading, Rect::new(0.0, 100.0, 800.0, 60.0));
        let doc = doc.into_shared();
        let scheduler = FrameScheduler::new();
        let events = EventDispatcher::new();
        let observer = IntersectionObserver::new(Rc::clone(&doc), &scheduler, &events);
        Page {
            doc,
            scheduler,
            _events: events,
            observer,
            heading,
        }
    }

    fn opacity(doc: &SharedDocument, id: ElementId) -> f32 {
        doc.borrow().tree.style(id).unwrap().opacity
    }

    #[test]
    fn test_reduced_motion_shows_text_without_frames() {
        let p = page("Built to last", true);
        let reveal = TextSplitReveal::mount(
            Rc::clone(&p.doc),
            &p.scheduler,
            &p.observer.handle(),
            p.heading,
            TextRevealOptions::default(),
        );

        assert!(!reveal.is_split());
        assert_eq!(opacity(&p.doc, p.heading), 1.0);
        assert_eq!(p.doc.borrow().tree.children(p.heading).len(), 1);
        assert!(!p.scheduler.has_pending());
        assert_eq!(p.scheduler.tick(16.0), 0);
    }

    #[test]
    fn test_words_reveal_on_intersection() {
        let p = page("Built to last", false);
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        let reveal = TextSplitReveal::mount(
            Rc::clone(&p.doc),
            &p.scheduler,
            &p.observer.handle(),
            p.heading,
            TextRevealOptions::default().on_complete(move || d.set(true)),
        );

        let units = reveal.units();
        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|&u| opacity(&p.doc, u) == 0.0));
        assert_eq!(p.doc.borrow().tree.attribute(p.heading, "aria-label"), Some("Built to last"));

        // Observer fires on the first frame, the tween starts on the next
        p.scheduler.tick(0.0);
        assert!(reveal.has_played());
        p.scheduler.tick(16.0);
        p.scheduler.tick(2000.0);
        assert!(units.iter().all(|&u| opacity(&p.doc, u) == 1.0));
        assert!(done.get());
    }

    #[test]
    fn test_set_text_releases_old_units() {
        let p = page("Hi there", false);
        let reveal = TextSplitReveal::mount(
            Rc::clone(&p.doc),
            &p.scheduler,
            &p.observer.handle(),
            p.heading,
            TextRevealOptions::default().with_split(SplitType::Chars),
        );
        assert_eq!(reveal.state.borrow().ctx.captured_count(), 7);

        for text in ["Good morning", "See you soon", "Yo"] {
            reveal.set_text(text);
        }
        assert_eq!(reveal.units().len(), 2);
        assert_eq!(reveal.state.borrow().ctx.captured_count(), 2);

        reveal.unmount();
        assert_eq!(reveal.state.borrow().ctx.captured_count(), 0);
    }

    #[test]
    fn test_reveal_chars_clip_words() {
        let p = page("Hi there", false);
        let reveal = TextSplitReveal::mount(
            Rc::clone(&p.doc),
            &p.scheduler,
            &p.observer.handle(),
            p.heading,
            TextRevealOptions::default()
                .with_split(SplitType::Chars)
                .with_variant(RevealVariant::Reveal)
                .untriggered(),
        );
        assert_eq!(reveal.units().len(), 7);
        let doc = p.doc.borrow();
        for &word in doc.tree.children(p.heading) {
            let style = doc.tree.style(word).unwrap();
            assert_eq!(style.overflow, Overflow::Hidden);
            assert_eq!(style.display, Display::InlineBlock);
        }
        let first_char = reveal.units()[0];
        assert_eq!(doc.tree.style(first_char).unwrap().y_percent, 100.0);
    }

    #[test]
    fn test_empty_text_is_shown() {
        let p = page("  ", false);
        p.doc.borrow_mut().tree.style_mut(p.heading).unwrap().opacity = 0.0;
        let reveal = TextSplitReveal::mount(
            Rc::clone(&p.doc),
            &p.scheduler,
            &p.observer.handle(),
            p.heading,
            TextRevealOptions::default(),
        );
        assert!(reveal.units().is_empty());
        assert_eq!(opacity(&p.doc, p.heading), 1.0);
    }

    #[test]
    fn test_split_failure_falls_back_to_visible() {
        let p = page("Title", false);
        {
            let mut doc = p.doc.borrow_mut();
            doc.tree.append_element(p.heading, "div").unwrap();
            doc.tree.style_mut(p.heading).unwrap().opacity = 0.0;
        }
        let reveal = TextSplitReveal::mount(
            Rc::clone(&p.doc),
            &p.scheduler,
            &p.observer.handle(),
            p.heading,
            TextRevealOptions::default(),
        );
        assert!(!reveal.is_split());
        assert_eq!(opacity(&p.doc, p.heading), 1.0);
    }

    #[test]
    fn test_set_text_and_unmount_restore() {
        let p = page("Old title", false);
        let reveal = TextSplitReveal::mount(
            Rc::clone(&p.doc),
            &p.scheduler,
            &p.observer.handle(),
            p.heading,
            TextRevealOptions::default().untriggered(),
        );
        reveal.set_text("A brand new title");
        assert_eq!(reveal.units().len(), 4);
        assert_eq!(p.doc.borrow().tree.text_content(p.heading), "A brand new title");

        drop(reveal);
        let doc = p.doc.borrow();
        assert_eq!(doc.tree.children(p.heading).len(), 1);
        assert_eq!(doc.tree.text_content(p.heading), "A brand new title");
        assert_eq!(doc.tree.attribute(p.heading, "aria-label"), None);
        assert_eq!(p.observer.observation_count(), 0);
    }

    #[test]
    fn test_animate_split_text_staggers_by_granularity() {
        let p = page("one two three", false);
        let split = {
            let mut doc = p.doc.borrow_mut();
            split_text(&mut doc, p.heading, SplitTypes::WORDS, &FixedAdvanceMeasure::default()).unwrap()
        };
        let ctx = AnimationContext::new(Rc::clone(&p.doc), &p.scheduler);
        let tweens = animate_split_text(&ctx, &split, SplitAnimationOptions::default());
        assert_eq!(tweens.len(), 3);

        // Word stagger is 0.06s: at 50ms only the first word has moved
        p.scheduler.tick(0.0);
        p.scheduler.tick(50.0);
        let words = split.words();
        assert!(opacity(&p.doc, words[0]) > 0.0);
        assert_eq!(opacity(&p.doc, words[1]), 0.0);
    }
}
