//! Sequences
//!
//! Entrance choreography for hero sections: steps run one after another
//! unless a step asks to overlap the previous one or to start at a fixed
//! time. A sequence is a plan; `play` turns it into ordinary tweens on an
//! `AnimationContext` with computed delays.

use lumen_core::ElementId;

use crate::context::{AnimationContext, TweenId};
use crate::tween::{Targets, TweenOptions};
use crate::values::StyleProps;

/// Where a step starts relative to the sequence
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Position {
    /// When the previous step ends
    #[default]
    End,
    /// This many seconds before the previous step ends
    Overlap(f32),
    /// At an absolute time in seconds from the sequence start
    At(f32),
}

#[derive(Clone, Debug)]
struct SequenceStep {
    targets: Targets,
    from: StyleProps,
    to: StyleProps,
    options: TweenOptions,
    position: Position,
}

/// An ordered list of tween steps
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    delay: f32,
    steps: Vec<SequenceStep>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the whole sequence in seconds
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    /// Append a step; steps with no live targets can be skipped by the
    /// caller simply by not adding them
    pub fn then(
        mut self,
        targets: &[ElementId],
        from: StyleProps,
        to: StyleProps,
        options: TweenOptions,
        position: Position,
    ) -> Self {
        self.steps.push(SequenceStep {
            targets: Targets::from_slice(targets),
            from,
            to,
            options,
            position,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start time of every step in seconds, sequence delay excluded
    pub fn start_times(&self) -> Vec<f32> {
        let mut cursor = 0.0f32;
        let mut starts = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let start = match step.position {
                Position::End => cursor,
                Position::Overlap(seconds) => (cursor - seconds).max(0.0),
                Position::At(seconds) => seconds.max(0.0),
            };
            starts.push(start);
            cursor = start + step.options.total_duration(step.targets.len());
        }
        starts
    }

    /// Seconds from the sequence start until its last step settles
    pub fn duration(&self) -> f32 {
        self.start_times()
            .iter()
            .zip(&self.steps)
            .map(|(start, step)| start + step.options.total_duration(step.targets.len()))
            .fold(0.0, f32::max)
    }

    /// Schedule every step on `ctx`; each step's `from` is applied now
    pub fn play(&self, ctx: &AnimationContext) -> Vec<TweenId> {
        self.start_times()
            .into_iter()
            .zip(&self.steps)
            .map(|(start, step)| {
                let options = step
                    .options
                    .with_delay(self.delay + start + step.options.delay);
                ctx.from_to(&step.targets, step.from, step.to, options)
            })
            .collect()
    }
}
