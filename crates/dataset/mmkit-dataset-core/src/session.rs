//! Editor session: the context object every host entry point goes through.

use log::info;

use crate::actor::Actor;
use crate::batch::{run_batch, BatchReport, Collaborators, FolderPicker, SourceGroups};
use crate::config::Config;
use crate::definition::DatasetDefinition;
use crate::error::Result;
use crate::graph::{GraphSlot, PlaybackGraph};
use crate::preview::{Clock, PreviewSession, PreviewState, PreviewTarget, SystemClock};

/// Owns the definition being edited, the target actor, the single playback graph and
/// the preview state between `open` and `close`.
pub struct EditorSession<G: PlaybackGraph + Default> {
    pub definition: DatasetDefinition,
    pub actor: Actor,
    pub config: Config,
    graph: GraphSlot<G>,
    preview: PreviewSession,
    clock: Box<dyn Clock>,
}

impl<G: PlaybackGraph + Default> EditorSession<G> {
    pub fn open(definition: DatasetDefinition, actor: Actor, config: Config) -> Self {
        Self::with_clock(definition, actor, config, Box::new(SystemClock::new()))
    }

    pub fn with_clock(
        definition: DatasetDefinition,
        actor: Actor,
        config: Config,
        clock: Box<dyn Clock>,
    ) -> Self {
        let preview = PreviewSession::open(&actor);
        info!("editor session opened for '{}'", actor.name);
        Self {
            definition,
            actor,
            config,
            graph: GraphSlot::new(),
            preview,
            clock,
        }
    }

    /// Run a calculation batch. Any running preview is stopped first since the batch
    /// takes over the graph.
    pub fn calculate(
        &mut self,
        groups: SourceGroups,
        picker: &mut dyn FolderPicker,
        collaborators: Collaborators<'_>,
    ) -> Result<BatchReport> {
        if self.preview.state() != PreviewState::Stopped {
            self.preview.stop(&mut self.actor);
        }
        run_batch(
            &mut self.definition,
            &mut self.actor,
            &mut self.graph,
            groups,
            picker,
            collaborators,
            &self.config,
        )
    }

    pub fn preview(&mut self, target: PreviewTarget) -> Result<()> {
        self.preview
            .preview(target, &mut self.definition, &mut self.actor, &mut self.graph)
    }

    pub fn play(&mut self) -> bool {
        let now = self.clock.now();
        self.preview.play(now)
    }

    pub fn pause(&mut self) -> bool {
        self.preview.pause()
    }

    pub fn stop(&mut self) {
        self.preview.stop(&mut self.actor);
    }

    pub fn scrub(&mut self, time: f32) -> bool {
        self.preview.scrub(time)
    }

    /// Per-frame hook; see [`PreviewSession::update`].
    pub fn update(&mut self) -> Result<Option<f32>> {
        let now = self.clock.now();
        self.preview
            .update(now, &mut self.definition, &mut self.actor, &mut self.graph)
    }

    /// The host is entering play mode and takes the actor over: drop the graph.
    /// It is re-acquired on the next preview or calculation.
    pub fn on_host_play_mode(&mut self) {
        self.graph.release();
    }

    pub fn graph_slot(&self) -> &GraphSlot<G> {
        &self.graph
    }

    pub fn preview_session(&self) -> &PreviewSession {
        &self.preview
    }

    /// Tear down: the graph is released and the actor returned at its session-start pose.
    pub fn close(mut self) -> (DatasetDefinition, Actor) {
        self.preview.stop(&mut self.actor);
        self.graph.release();
        info!("editor session closed for '{}'", self.actor.name);
        (self.definition, self.actor)
    }
}
