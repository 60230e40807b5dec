//! Skeletal playback graph contract, the exclusive slot that owns it, and a
//! deterministic mixer implementation for headless use and tests.

use log::debug;

use crate::actor::Actor;
use crate::error::{DatasetError, Result};
use crate::source::AnimationClip;

/// Host capability that evaluates blended or sequenced clips into poses over time.
///
/// Implementations bind to one actor on [`initialize`](Self::initialize) and write the
/// evaluated root motion back into it on [`evaluate`](Self::evaluate).
pub trait PlaybackGraph {
    fn initialize(&mut self, actor: &Actor) -> Result<()>;
    fn destroy(&mut self);
    fn is_valid(&self) -> bool;

    fn clear_mixer_inputs(&mut self);
    /// Connect a clip to the main mixer, returning its input index.
    fn add_mixer_input(&mut self, clip: &AnimationClip, weight: f32) -> usize;
    fn set_mixer_input_weight(&mut self, index: usize, weight: f32);
    /// Seek one mixer input to a local clip time.
    fn set_mixer_input_time(&mut self, index: usize, time: f32);
    fn mixer_input_count(&self) -> usize;

    /// Step the graph by `delta_time` seconds.
    fn evaluate(&mut self, actor: &mut Actor, delta_time: f32);
}

/// Exclusively-owned handle to the single playback graph of a session.
///
/// The graph is created lazily by [`acquire`](Self::acquire) and torn down by
/// [`release`](Self::release); callers never test for a live graph by hand.
#[derive(Debug, Default)]
pub struct GraphSlot<G> {
    graph: Option<G>,
}

impl<G: PlaybackGraph + Default> GraphSlot<G> {
    pub fn new() -> Self {
        Self { graph: None }
    }

    /// Return the live graph, (re)initializing it for `actor` when absent or invalid.
    pub fn acquire(&mut self, actor: &Actor) -> Result<&mut G> {
        let graph = self.graph.get_or_insert_with(G::default);
        if !graph.is_valid() {
            graph.initialize(actor)?;
            if !graph.is_valid() {
                return Err(DatasetError::graph(format!(
                    "graph did not become valid for actor '{}'",
                    actor.name
                )));
            }
            debug!("playback graph initialized for '{}'", actor.name);
        }
        Ok(graph)
    }
}

impl<G: PlaybackGraph> GraphSlot<G> {
    /// Destroy the graph if it is live. The slot keeps the instance for reuse.
    pub fn release(&mut self) {
        if let Some(graph) = self.graph.as_mut() {
            if graph.is_valid() {
                graph.destroy();
                debug!("playback graph released");
            }
        }
    }

    /// The graph, only while it is valid.
    pub fn live_mut(&mut self) -> Option<&mut G> {
        self.graph.as_mut().filter(|g| g.is_valid())
    }

    pub fn live(&self) -> Option<&G> {
        self.graph.as_ref().filter(|g| g.is_valid())
    }

    pub fn is_live(&self) -> bool {
        self.live().is_some()
    }
}

/// Wrap `t` into `[0, len)`; a non-positive length maps everything to 0.
pub(crate) fn wrap_time(t: f32, len: f32) -> f32 {
    if len <= 0.0 || !t.is_finite() {
        return 0.0;
    }
    let m = t % len;
    let m = if m < 0.0 { m + len } else { m };
    // `m + len` can round up to `len` for tiny negative remainders.
    if m >= len {
        0.0
    } else {
        m
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MixerInput {
    pub clip: AnimationClip,
    pub weight: f32,
    pub time: f32,
}

/// Reference [`PlaybackGraph`]: a flat mixer whose inputs advance in clip-local time and
/// move the actor root by the weighted sum of their clips' root velocities.
#[derive(Clone, Debug, Default)]
pub struct MixerGraph {
    valid: bool,
    bound_actor: Option<String>,
    inputs: Vec<MixerInput>,
    /// Sum of every `evaluate` delta since initialization.
    pub elapsed: f32,
    /// Number of `evaluate` calls since initialization.
    pub evaluations: usize,
    /// Number of times the graph has been initialized over its lifetime.
    pub initializations: usize,
}

impl MixerGraph {
    pub fn inputs(&self) -> &[MixerInput] {
        &self.inputs
    }

    pub fn bound_actor(&self) -> Option<&str> {
        self.bound_actor.as_deref()
    }
}

impl PlaybackGraph for MixerGraph {
    fn initialize(&mut self, actor: &Actor) -> Result<()> {
        actor.validate()?;
        self.valid = true;
        self.bound_actor = Some(actor.name.clone());
        self.inputs.clear();
        self.elapsed = 0.0;
        self.evaluations = 0;
        self.initializations += 1;
        Ok(())
    }

    fn destroy(&mut self) {
        self.valid = false;
        self.bound_actor = None;
        self.inputs.clear();
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn clear_mixer_inputs(&mut self) {
        self.inputs.clear();
    }

    fn add_mixer_input(&mut self, clip: &AnimationClip, weight: f32) -> usize {
        self.inputs.push(MixerInput {
            clip: clip.clone(),
            weight,
            time: 0.0,
        });
        self.inputs.len() - 1
    }

    fn set_mixer_input_weight(&mut self, index: usize, weight: f32) {
        if let Some(input) = self.inputs.get_mut(index) {
            input.weight = weight;
        }
    }

    fn set_mixer_input_time(&mut self, index: usize, time: f32) {
        if let Some(input) = self.inputs.get_mut(index) {
            input.time = time;
        }
    }

    fn mixer_input_count(&self) -> usize {
        self.inputs.len()
    }

    fn evaluate(&mut self, actor: &mut Actor, delta_time: f32) {
        if !self.valid {
            return;
        }
        let mut displacement = [0.0f32; 3];
        for input in &mut self.inputs {
            let length = input.clip.length;
            let advanced = input.time + delta_time;
            input.time = if input.clip.looping {
                wrap_time(advanced, length)
            } else {
                advanced.clamp(0.0, length.max(0.0))
            };
            for (d, v) in displacement.iter_mut().zip(input.clip.root_velocity) {
                *d += v * input.weight * delta_time;
            }
        }
        for (p, d) in actor.root.position.iter_mut().zip(displacement) {
            *p += d;
        }
        self.elapsed += delta_time;
        self.evaluations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(name: &str, length: f32, looping: bool) -> AnimationClip {
        AnimationClip {
            name: name.into(),
            length,
            looping,
            root_velocity: [1.0, 0.0, 0.0],
        }
    }

    #[test]
    fn wrap_time_stays_in_range() {
        assert_eq!(wrap_time(2.5, 2.0), 0.5);
        assert_eq!(wrap_time(-0.5, 2.0), 1.5);
        assert_eq!(wrap_time(2.0, 2.0), 0.0);
        assert_eq!(wrap_time(1.0, 0.0), 0.0);
        let w = wrap_time(-1e-9, 2.0);
        assert!((0.0..2.0).contains(&w));
    }

    #[test]
    fn slot_acquires_lazily_and_reuses_instance() {
        let actor = Actor::new("Hero");
        let mut slot: GraphSlot<MixerGraph> = GraphSlot::new();
        assert!(!slot.is_live());

        slot.acquire(&actor).unwrap();
        assert!(slot.is_live());
        slot.acquire(&actor).unwrap();
        assert_eq!(slot.live().unwrap().initializations, 1);

        slot.release();
        assert!(!slot.is_live());
        assert!(slot.live_mut().is_none());

        let graph = slot.acquire(&actor).unwrap();
        assert_eq!(graph.initializations, 2);
    }

    #[test]
    fn mixer_moves_root_by_weighted_velocity() {
        let mut actor = Actor::new("Hero");
        let mut graph = MixerGraph::default();
        graph.initialize(&actor).unwrap();
        graph.add_mixer_input(&clip("Walk", 1.0, true), 0.25);
        graph.add_mixer_input(&clip("Run", 1.0, false), 0.75);

        graph.evaluate(&mut actor, 0.5);
        assert!((actor.root.position[0] - 0.5).abs() < 1e-6);

        graph.evaluate(&mut actor, 0.75);
        assert!((graph.inputs()[0].time - 0.25).abs() < 1e-6);
        assert_eq!(graph.inputs()[1].time, 1.0);
        assert_eq!(graph.evaluations, 2);
    }

    #[test]
    fn destroyed_graph_ignores_evaluate() {
        let mut actor = Actor::new("Hero");
        let mut graph = MixerGraph::default();
        graph.initialize(&actor).unwrap();
        graph.add_mixer_input(&clip("Walk", 1.0, true), 1.0);
        graph.destroy();
        graph.evaluate(&mut actor, 1.0);
        assert_eq!(actor.root.position, [0.0; 3]);
        assert_eq!(graph.mixer_input_count(), 0);
    }
}
