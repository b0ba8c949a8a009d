//! Timer-driven rotation of one page zone (carousel, ticker, fading
//! gallery, auto-scrolling list).
//!
//! [`Rotator`] is the pure state machine; [`spawn`] runs one on a tokio task
//! and hands back a [`RotatorHandle`] that publishes every state change and
//! cancels the task when dropped.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    TransitioningOut,
    TransitioningIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotatorState {
    pub index: usize,
    pub phase: Phase,
}

impl RotatorState {
    const fn idle(index: usize) -> Self {
        Self {
            index,
            phase: Phase::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    Fade,
    Slide,
    Scroll,
}

/// What happens after the last item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapPolicy {
    /// Animate from the last item to the first like any other step.
    Cycle,
    /// Jump straight back to the first item without transition phases.
    Rewind,
}

#[derive(Debug, Clone, Copy)]
pub struct RotatorSpec {
    pub period: Duration,
    pub transition: Duration,
    pub style: TransitionStyle,
    pub wrap: WrapPolicy,
}

impl RotatorSpec {
    /// The period has to leave room for both transition phases, otherwise
    /// the next timer fire would land in the middle of a transition.
    pub fn new(
        period: Duration,
        transition: Duration,
        style: TransitionStyle,
        wrap: WrapPolicy,
    ) -> anyhow::Result<Self> {
        if period <= transition * 2 {
            anyhow::bail!(
                "rotation period {:?} must exceed twice the transition {:?}",
                period,
                transition
            );
        }
        Ok(Self {
            period,
            transition,
            style,
            wrap,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Rotator {
    len: usize,
    wrap: WrapPolicy,
    state: RotatorState,
}

impl Rotator {
    /// `None` for an empty zone: there is nothing to rotate.
    pub fn new(len: usize, wrap: WrapPolicy) -> Option<Self> {
        (len > 0).then_some(Self {
            len,
            wrap,
            state: RotatorState::idle(0),
        })
    }

    pub fn state(&self) -> RotatorState {
        self.state
    }

    /// Advance one phase and return the new state.
    pub fn step(&mut self) -> RotatorState {
        let RotatorState { index, phase } = self.state;
        self.state = match phase {
            Phase::Idle if self.wrap == WrapPolicy::Rewind && index + 1 == self.len => {
                RotatorState::idle(0)
            }
            Phase::Idle => RotatorState {
                index,
                phase: Phase::TransitioningOut,
            },
            Phase::TransitioningOut => RotatorState {
                index: (index + 1) % self.len,
                phase: Phase::TransitioningIn,
            },
            Phase::TransitioningIn => RotatorState::idle(index),
        };
        self.state
    }
}

/// A running rotator. Dropping the handle stops its timer.
pub struct RotatorHandle {
    style: TransitionStyle,
    state: watch::Receiver<RotatorState>,
    task: JoinHandle<()>,
}

impl RotatorHandle {
    pub fn style(&self) -> TransitionStyle {
        self.style
    }

    pub fn current(&self) -> RotatorState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RotatorState> {
        self.state.clone()
    }

    /// Cancel the timer now. Subscribers see their stream end.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for RotatorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start rotating `len` items. No timer is armed for an empty zone.
pub fn spawn(name: &'static str, len: usize, spec: RotatorSpec) -> Option<RotatorHandle> {
    let mut rotator = Rotator::new(len, spec.wrap)?;
    let (tx, rx) = watch::channel(rotator.state());

    let task = tokio::spawn(async move {
        let mut timer = interval_at(Instant::now() + spec.period, spec.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            let state = rotator.step();
            tx.send_replace(state);
            if state.phase == Phase::Idle {
                continue;
            }
            sleep(spec.transition).await;
            tx.send_replace(rotator.step());
            sleep(spec.transition).await;
            tx.send_replace(rotator.step());
        }
    });
    tracing::debug!("Rotator '{}' started with {} item(s)", name, len);

    Some(RotatorHandle {
        style: spec.style,
        state: rx,
        task,
    })
}
