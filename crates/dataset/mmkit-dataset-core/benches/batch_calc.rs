use std::path::{Path, PathBuf};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mmkit_dataset::{
    run_batch, stitch_intervals, Actor, Collaborators, Config, ContactPoint,
    ContactPointRecalculator, DatasetDefinition, ExtractRequest, FeatureRecord, GraphSlot,
    MemoryAssetStore, MixerGraph, MotionMatchingDataset, PlaybackGraph, PoseFeatureExtractor,
    Result, SourceGroups, StitchSegment,
};

struct SamplingExtractor;

impl PoseFeatureExtractor for SamplingExtractor {
    fn extract(
        &mut self,
        request: &ExtractRequest<'_>,
        graph: &mut dyn PlaybackGraph,
        actor: &mut Actor,
    ) -> Result<MotionMatchingDataset> {
        let length = request.source.length();
        let dt = 1.0 / request.sample_rate;
        let mut dataset = MotionMatchingDataset::new(request.name, length);
        let mut t = 0.0;
        while t <= length {
            graph.evaluate(actor, dt);
            let mut values = actor.root.position.to_vec();
            values.extend_from_slice(request.trajectory_offsets);
            dataset.features.push(FeatureRecord { time: t, values });
            t += dt;
        }
        Ok(dataset)
    }
}

struct KeepPoints;

impl ContactPointRecalculator for KeepPoints {
    fn recalculate(
        &mut self,
        _dataset: &MotionMatchingDataset,
        points: &[ContactPoint],
        _graph: &mut dyn PlaybackGraph,
        _actor: &mut Actor,
    ) -> Result<Vec<ContactPoint>> {
        Ok(points.to_vec())
    }
}

fn bench_batch(c: &mut Criterion) {
    let base: DatasetDefinition =
        mmkit_test_fixtures::definitions::load("locomotion").expect("locomotion fixture");
    let actor: Actor = mmkit_test_fixtures::actors::load("biped").expect("biped fixture");
    let config = Config::default();

    c.bench_function("locomotion_batch_memory_store", |b| {
        b.iter(|| {
            let mut definition = base.clone();
            let mut actor = actor.clone();
            let mut slot = GraphSlot::<MixerGraph>::new();
            let mut store = MemoryAssetStore::new();
            let mut picker = |_: Option<&Path>| Some(PathBuf::from("bench"));
            let report = run_batch(
                &mut definition,
                &mut actor,
                &mut slot,
                SourceGroups::ALL,
                &mut picker,
                Collaborators {
                    extractor: &mut SamplingExtractor,
                    recalculator: &mut KeepPoints,
                    store: &mut store,
                },
                &config,
            )
            .expect("batch");
            black_box(report.written())
        })
    });
}

fn bench_stitch(c: &mut Criterion) {
    let segments: Vec<StitchSegment> = (0..256)
        .map(|i| StitchSegment {
            duration: 0.5 + (i % 7) as f32 * 0.1,
            searchable: i % 3 != 0,
        })
        .collect();
    c.bench_function("stitch_intervals_256", |b| {
        b.iter(|| black_box(stitch_intervals(black_box(&segments), 0.1)))
    });
}

criterion_group!(benches, bench_batch, bench_stitch);
criterion_main!(benches);
