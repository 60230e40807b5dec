//! Interactive preview of one blend tree or sequence on the session's playback graph.
//!
//! ```text
//!            preview            play
//! Stopped ───────────▶ Previewing ─────▶ Playing
//!    ▲                  ▲      ◀─────
//!    └──── stop ────────┘       pause
//! ```
//!
//! `preview` is accepted from every state and `stop` returns to `Stopped` from every
//! state. While not stopped, [`PreviewSession::update`] steps the graph once per frame.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, RootPose};
use crate::definition::DatasetDefinition;
use crate::error::{DatasetError, Result};
use crate::graph::{wrap_time, GraphSlot, PlaybackGraph};
use crate::source::normalized_weights;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewState {
    #[default]
    Stopped,
    /// Paused; the scrub time drives the graph.
    Previewing,
    /// Wall-clock driven.
    Playing,
}

/// Which definition entry is previewed, by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewTarget {
    BlendTree(usize),
    Sequence(usize),
}

/// Wall-clock source, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreviewSession {
    state: PreviewState,
    target: Option<PreviewTarget>,
    scrub_time: f32,
    applied_scrub_time: f32,
    max_length: f32,
    reference_time: f64,
    start_pose: RootPose,
}

impl PreviewSession {
    /// Start a session, capturing the actor pose that `stop` restores.
    pub fn open(actor: &Actor) -> Self {
        Self {
            state: PreviewState::Stopped,
            target: None,
            scrub_time: 0.0,
            applied_scrub_time: 0.0,
            max_length: 0.0,
            reference_time: 0.0,
            start_pose: actor.root,
        }
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn target(&self) -> Option<PreviewTarget> {
        self.target
    }

    pub fn scrub_time(&self) -> f32 {
        self.scrub_time
    }

    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    pub fn start_pose(&self) -> RootPose {
        self.start_pose
    }

    /// Build the graph topology for `target` and enter `Previewing` at time 0.
    ///
    /// An unknown index, a structurally invalid source or a zero-length source is
    /// rejected with [`DatasetError::InvalidDefinition`] before anything changes.
    pub fn preview<G: PlaybackGraph + Default>(
        &mut self,
        target: PreviewTarget,
        definition: &mut DatasetDefinition,
        actor: &mut Actor,
        slot: &mut GraphSlot<G>,
    ) -> Result<()> {
        let max_length = match target {
            PreviewTarget::BlendTree(idx) => {
                let tree = definition.blend_trees.get(idx).ok_or_else(|| {
                    DatasetError::invalid(format!("no blend tree at index {idx}"))
                })?;
                if !tree.is_valid() {
                    return Err(DatasetError::invalid(format!(
                        "blend tree '{}' cannot be previewed",
                        tree.name
                    )));
                }
                tree.length()
            }
            PreviewTarget::Sequence(idx) => {
                let seq = definition
                    .sequences
                    .get(idx)
                    .ok_or_else(|| DatasetError::invalid(format!("no sequence at index {idx}")))?;
                if !seq.is_valid() {
                    return Err(DatasetError::invalid(format!(
                        "sequence '{}' cannot be previewed",
                        seq.name
                    )));
                }
                seq.length()
            }
        };
        if !max_length.is_finite() || max_length <= 0.0 {
            return Err(DatasetError::invalid("preview target has zero length"));
        }

        actor.root = self.start_pose;
        let graph = slot.acquire(actor)?;
        graph.clear_mixer_inputs();
        match target {
            PreviewTarget::BlendTree(idx) => {
                let tree = &definition.blend_trees[idx];
                let weights =
                    normalized_weights(&tree.clip_weights).unwrap_or_else(|_| tree.clip_weights.clone());
                tree.create_graph_for(graph, &weights);
            }
            PreviewTarget::Sequence(idx) => {
                definition.sequences[idx].create_animations_in_time(0.0, graph);
            }
        }

        self.target = Some(target);
        self.max_length = max_length;
        self.scrub_time = 0.0;
        self.applied_scrub_time = 0.0;
        self.state = PreviewState::Previewing;
        debug!("preview of {target:?} ready, length {max_length}");
        Ok(())
    }

    /// `Previewing` → `Playing`. Returns whether the transition happened.
    pub fn play(&mut self, now: f64) -> bool {
        if self.state != PreviewState::Previewing {
            return false;
        }
        self.reference_time = now;
        self.state = PreviewState::Playing;
        debug!("preview playing from {}", self.scrub_time);
        true
    }

    /// `Playing` → `Previewing`, freezing the scrub time.
    pub fn pause(&mut self) -> bool {
        if self.state != PreviewState::Playing {
            return false;
        }
        self.state = PreviewState::Previewing;
        debug!("preview paused at {}", self.scrub_time);
        true
    }

    /// Back to `Stopped` with the actor at its session-start pose. The graph is kept.
    pub fn stop(&mut self, actor: &mut Actor) {
        self.scrub_time = 0.0;
        self.applied_scrub_time = 0.0;
        actor.root = self.start_pose;
        self.state = PreviewState::Stopped;
        debug!("preview stopped");
    }

    /// Move the scrub head while paused. Applied on the next `update`.
    pub fn scrub(&mut self, time: f32) -> bool {
        if self.state != PreviewState::Previewing || !time.is_finite() {
            return false;
        }
        self.scrub_time = time;
        true
    }

    /// Per-frame step. Returns the delta the graph was stepped by, or `None` when
    /// nothing ran (stopped, no live graph, or no time passed).
    ///
    /// In blend mode, weights summing to zero or less fail with
    /// [`DatasetError::InvalidWeights`] and leave the session and graph untouched.
    pub fn update<G: PlaybackGraph>(
        &mut self,
        now: f64,
        definition: &mut DatasetDefinition,
        actor: &mut Actor,
        slot: &mut GraphSlot<G>,
    ) -> Result<Option<f32>> {
        if self.state == PreviewState::Stopped {
            return Ok(None);
        }
        let Some(target) = self.target else {
            return Ok(None);
        };
        let Some(graph) = slot.live_mut() else {
            return Ok(None);
        };

        let delta = match self.state {
            PreviewState::Playing => (now - self.reference_time) as f32,
            _ => self.scrub_time - self.applied_scrub_time,
        };
        if delta == 0.0 || !delta.is_finite() {
            return Ok(None);
        }

        let blend_weights = match target {
            PreviewTarget::BlendTree(idx) => {
                let tree = definition.blend_trees.get(idx).ok_or_else(|| {
                    DatasetError::invalid(format!("no blend tree at index {idx}"))
                })?;
                Some((normalized_weights(&tree.clip_weights)?, tree.clips.len()))
            }
            PreviewTarget::Sequence(idx) => {
                if idx >= definition.sequences.len() {
                    return Err(DatasetError::invalid(format!("no sequence at index {idx}")));
                }
                None
            }
        };

        if self.state == PreviewState::Playing {
            self.scrub_time += delta;
            self.reference_time = now;
        }
        self.scrub_time = wrap_time(self.scrub_time, self.max_length);
        self.applied_scrub_time = self.scrub_time;

        match (target, blend_weights) {
            (_, Some((weights, clip_count))) => {
                if graph.mixer_input_count() == clip_count {
                    for (idx, weight) in weights.into_iter().enumerate() {
                        graph.set_mixer_input_weight(idx, weight);
                    }
                } else {
                    debug!("mixer topology is stale, keeping current weights");
                }
                graph.evaluate(actor, delta);
            }
            (PreviewTarget::Sequence(idx), None) => {
                graph.evaluate(actor, delta);
                definition.sequences[idx].update(graph, delta);
            }
            (PreviewTarget::BlendTree(_), None) => {}
        }
        Ok(Some(delta))
    }
}
