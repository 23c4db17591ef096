//! Reveal animation for a freshly computed layout.
//!
//! A run stages every node at the layout center, fades it in, scatters it to
//! a random far point and then settles it at its final position. Phases are
//! advanced from elapsed time since the run started; every entry point takes
//! the run's token so calls belonging to an earlier run are ignored.

use std::f64::consts::TAU;
use std::time::Duration;

use tracing::trace;

use super::layout::{GraphLayout, Point};
use super::random::RandomSource;

/// Minimum explosion distance from the center.
pub const EXPLOSION_MIN_DISTANCE: f64 = 400.0;

/// Random extra explosion distance, scaled by a unit sample.
pub const EXPLOSION_EXTRA_DISTANCE: f64 = 500.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    #[default]
    Idle,
    FadingIn,
    Exploding,
    Settling,
    Done,
}

impl Phase {
    fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::FadingIn),
            Self::FadingIn => Some(Self::Exploding),
            Self::Exploding => Some(Self::Settling),
            Self::Settling => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// Identifies one animation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunToken(u64);

/// Phase start offsets and transition lengths, measured from run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub fade_in_at: Duration,
    pub fade_in_duration: Duration,
    pub explode_at: Duration,
    pub explode_duration: Duration,
    pub settle_at: Duration,
    pub settle_duration: Duration,
    pub done_at: Duration,
    pub fit_delay: Duration,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            fade_in_at: Duration::from_millis(100),
            fade_in_duration: Duration::from_millis(600),
            explode_at: Duration::from_millis(300),
            explode_duration: Duration::from_millis(2000),
            settle_at: Duration::from_millis(2300),
            settle_duration: Duration::from_millis(3300),
            done_at: Duration::from_millis(5800),
            fit_delay: Duration::from_millis(500),
        }
    }
}

impl Timeline {
    /// Phase that should be active at `elapsed`.
    pub fn phase_at(&self, elapsed: Duration) -> Phase {
        if elapsed >= self.done_at {
            Phase::Done
        } else if elapsed >= self.settle_at {
            Phase::Settling
        } else if elapsed >= self.explode_at {
            Phase::Exploding
        } else if elapsed >= self.fade_in_at {
            Phase::FadingIn
        } else {
            Phase::Idle
        }
    }

    pub fn fit_at(&self) -> Duration {
        self.done_at + self.fit_delay
    }
}

/// Outcome of advancing the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The token belongs to an earlier run; nothing changed.
    Stale,
    /// No new phase was due.
    Unchanged,
    /// One or more phases were applied, ending at this one.
    Advanced(Phase),
}

/// Drives the reveal sequence for one layout at a time.
#[derive(Debug, Default)]
pub struct RevealAnimator {
    layout: Option<GraphLayout>,
    timeline: Timeline,
    token: RunToken,
    phase: Phase,
    fit_pending: bool,
    fit_ready: bool,
}

impl RevealAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> Option<&GraphLayout> {
        self.layout.as_ref()
    }

    /// Token of the current run.
    pub fn token(&self) -> RunToken {
        self.token
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a run is in progress.
    pub fn is_animating(&self) -> bool {
        self.layout.is_some() && self.phase != Phase::Done
    }

    /// Replaces the layout and begins a new run.
    pub fn start(&mut self, layout: GraphLayout, rng: &mut dyn RandomSource) -> RunToken {
        self.layout = Some(layout);
        self.stage(rng)
    }

    /// Restarts the current layout with fresh explosion targets.
    ///
    /// Returns `None` when there is no layout to replay.
    pub fn replay(&mut self, rng: &mut dyn RandomSource) -> Option<RunToken> {
        self.layout.as_ref()?;
        Some(self.stage(rng))
    }

    /// Drops the layout. Tokens from earlier runs become stale.
    pub fn clear(&mut self) {
        self.layout = None;
        self.token.0 += 1;
        self.phase = Phase::Idle;
        self.fit_pending = false;
        self.fit_ready = false;
    }

    fn stage(&mut self, rng: &mut dyn RandomSource) -> RunToken {
        self.token.0 += 1;
        self.phase = Phase::Idle;
        self.fit_pending = true;
        self.fit_ready = false;

        if let Some(layout) = self.layout.as_mut() {
            let center = layout.center;
            for node in &mut layout.nodes {
                let angle = TAU * rng.next_unit();
                let distance = EXPLOSION_MIN_DISTANCE + EXPLOSION_EXTRA_DISTANCE * rng.next_unit();
                node.explosion_target = center.offset(angle, distance);
                node.position = center;
                node.opacity = 0.0;
            }
        }

        self.token
    }

    /// Applies every phase due at `elapsed` since the run started.
    pub fn tick(&mut self, token: RunToken, elapsed: Duration) -> Tick {
        if !self.is_current(token) {
            trace!(?token, current = ?self.token, "ignoring stale animation tick");
            return Tick::Stale;
        }

        let due = self.timeline.phase_at(elapsed);
        let mut advanced = false;
        while self.phase < due {
            let Some(next) = self.phase.next() else { break };
            self.enter(next);
            advanced = true;
        }

        if self.phase == Phase::Done && self.fit_pending && elapsed >= self.timeline.fit_at() {
            self.fit_ready = true;
        }

        if advanced {
            Tick::Advanced(self.phase)
        } else {
            Tick::Unchanged
        }
    }

    /// Jumps straight to `phase` for the run identified by `token`.
    ///
    /// Phases only move forward; an earlier or equal phase is `Unchanged`.
    pub fn apply_phase(&mut self, token: RunToken, phase: Phase) -> Tick {
        if !self.is_current(token) {
            trace!(?token, current = ?self.token, ?phase, "ignoring stale phase callback");
            return Tick::Stale;
        }
        if phase <= self.phase {
            return Tick::Unchanged;
        }
        while self.phase < phase {
            let Some(next) = self.phase.next() else { break };
            self.enter(next);
        }
        Tick::Advanced(self.phase)
    }

    /// Returns true once per run, after the post-animation fit delay.
    pub fn take_fit_request(&mut self) -> bool {
        if self.fit_ready {
            self.fit_ready = false;
            self.fit_pending = false;
            true
        } else {
            false
        }
    }

    /// Interpolated position of node `index` at `elapsed`.
    pub fn rendered_position(&self, index: usize, elapsed: Duration) -> Option<Point> {
        let layout = self.layout.as_ref()?;
        let node = layout.nodes.get(index)?;
        let t = &self.timeline;

        Some(match self.phase {
            Phase::Idle | Phase::FadingIn => layout.center,
            Phase::Exploding => layout.center.lerp(
                node.explosion_target,
                progress(elapsed, t.explode_at, t.explode_duration),
            ),
            Phase::Settling => node.explosion_target.lerp(
                node.final_position,
                progress(elapsed, t.settle_at, t.settle_duration),
            ),
            Phase::Done => node.final_position,
        })
    }

    /// Interpolated opacity of node `index` at `elapsed`.
    pub fn rendered_opacity(&self, index: usize, elapsed: Duration) -> Option<f64> {
        let layout = self.layout.as_ref()?;
        layout.nodes.get(index)?;

        // The fade overlaps the start of the explosion.
        Some(match self.phase {
            Phase::Idle => 0.0,
            Phase::Done => 1.0,
            _ => progress(
                elapsed,
                self.timeline.fade_in_at,
                self.timeline.fade_in_duration,
            ),
        })
    }

    fn is_current(&self, token: RunToken) -> bool {
        self.layout.is_some() && token == self.token
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        let Some(layout) = self.layout.as_mut() else {
            return;
        };
        for node in &mut layout.nodes {
            match phase {
                Phase::Idle => {}
                Phase::FadingIn => node.opacity = 1.0,
                Phase::Exploding => node.position = node.explosion_target,
                Phase::Settling | Phase::Done => node.position = node.final_position,
            }
        }
    }
}

/// Eased progress through a transition starting at `start`.
fn progress(elapsed: Duration, start: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let t = elapsed.saturating_sub(start).as_secs_f64() / duration.as_secs_f64();
    ease_out(t.clamp(0.0, 1.0))
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}
