mod common;

use std::path::Path;

use mmkit_dataset::{
    asset_path, persist_dataset, AssetStore, Config, ContactPoint, DatasetError, ErrorKind,
    FeatureRecord, FsAssetStore, GraphSlot, MemoryAssetStore, MergeOutcome, MixerGraph,
    MotionMatchingDataset, StoredRecord,
};

use common::ClampingRecalculator;

fn computed(name: &str, length: f32, marker: f32) -> MotionMatchingDataset {
    let mut dataset = MotionMatchingDataset::new(name, length);
    dataset.sample_rate = 30.0;
    dataset.features.push(FeatureRecord {
        time: 0.0,
        values: vec![marker],
    });
    dataset.exclude(0.0, 0.2);
    dataset
}

struct Env {
    actor: mmkit_dataset::Actor,
    slot: GraphSlot<MixerGraph>,
    recalculator: ClampingRecalculator,
}

impl Env {
    fn new() -> Self {
        Self {
            actor: common::biped(),
            slot: GraphSlot::new(),
            recalculator: ClampingRecalculator::default(),
        }
    }

    fn persist(
        &mut self,
        store: &mut dyn AssetStore,
        path: &Path,
        dataset: MotionMatchingDataset,
    ) -> mmkit_dataset::Result<MergeOutcome> {
        let graph = self.slot.acquire(&self.actor)?;
        persist_dataset(
            store,
            path,
            dataset,
            &mut self.recalculator,
            graph,
            &mut self.actor,
        )
    }
}

#[test]
fn asset_paths_use_configured_extension() {
    let config = Config::default();
    assert_eq!(
        asset_path(Path::new("data"), "Walk", &config),
        Path::new("data/Walk.asset")
    );
    let custom = Config {
        asset_extension: "mmd".into(),
        ..Config::default()
    };
    assert_eq!(
        asset_path(Path::new("data"), "Walk", &custom),
        Path::new("data/Walk.mmd")
    );
}

#[test]
fn second_persist_merges_into_existing_identity() {
    let mut env = Env::new();
    let mut store = MemoryAssetStore::new();
    let path = Path::new("out/Walk.asset");

    let first = computed("Walk", 2.0, 1.0);
    let original_id = first.id;
    assert_eq!(
        env.persist(&mut store, path, first).unwrap(),
        MergeOutcome::Created
    );

    let second = computed("Walk", 2.5, 7.0);
    assert_ne!(second.id, original_id);
    assert_eq!(
        env.persist(&mut store, path, second.clone()).unwrap(),
        MergeOutcome::Updated
    );

    let stored = store.dataset(path).unwrap();
    assert_eq!(stored.id, original_id);
    assert!(stored.same_computed_fields(&second));
    assert!(stored.contact_points.is_empty());
    assert_eq!(env.recalculator.calls, 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn existing_contact_points_are_recomputed() {
    let mut env = Env::new();
    let mut store = MemoryAssetStore::new();
    let path = Path::new("out/Run.asset");

    let mut existing = computed("Run", 2.0, 1.0);
    existing.contact_points = vec![
        ContactPoint {
            name: "LeftFoot".into(),
            time: 0.4,
        },
        ContactPoint {
            name: "RightFoot".into(),
            time: 1.8,
        },
    ];
    store.insert(path, StoredRecord::Dataset(existing));

    env.persist(&mut store, path, computed("Run", 1.0, 2.0))
        .unwrap();
    let stored = store.dataset(path).unwrap();
    assert_eq!(env.recalculator.calls, 1);
    assert_eq!(stored.contact_points.len(), 2);
    assert_eq!(stored.contact_points[1].time, 1.0);
    assert_eq!(stored.length, 1.0);
}

#[test]
fn foreign_record_is_a_type_mismatch() {
    let mut env = Env::new();
    let mut store = MemoryAssetStore::new();
    let path = Path::new("out/Idle.asset");
    store.insert(
        path,
        StoredRecord::Foreign {
            type_name: "material".into(),
        },
    );

    let err = env
        .persist(&mut store, path, computed("Idle", 1.0, 0.0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    match err {
        DatasetError::TypeMismatch { found, .. } => assert_eq!(found, "material"),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(store.get(path).unwrap().type_name(), "material");
}

#[test]
fn merging_identical_results_is_idempotent() {
    let mut env = Env::new();
    let mut store = MemoryAssetStore::new();
    let path = Path::new("out/Walk.asset");

    env.persist(&mut store, path, computed("Walk", 2.0, 3.0))
        .unwrap();
    env.persist(&mut store, path, computed("Walk", 2.0, 3.0))
        .unwrap();
    let once = store.dataset(path).unwrap().clone();
    env.persist(&mut store, path, computed("Walk", 2.0, 3.0))
        .unwrap();
    assert_eq!(store.dataset(path).unwrap(), &once);
}

#[test]
fn file_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = Env::new();
    let mut store = FsAssetStore::new(dir.path());
    let path = Path::new("out/Walk.asset");

    let first = computed("Walk", 2.0, 1.0);
    let id = first.id;
    assert_eq!(
        env.persist(&mut store, path, first).unwrap(),
        MergeOutcome::Created
    );
    assert!(dir.path().join(path).is_file());

    assert_eq!(
        env.persist(&mut store, path, computed("Walk", 3.0, 2.0))
            .unwrap(),
        MergeOutcome::Updated
    );
    match store.load(path).unwrap() {
        Some(StoredRecord::Dataset(d)) => {
            assert_eq!(d.id, id);
            assert_eq!(d.length, 3.0);
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn file_store_enforces_create_and_update_rules() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FsAssetStore::new(dir.path());
    let path = Path::new("Walk.asset");
    let record = StoredRecord::Dataset(computed("Walk", 1.0, 0.0));

    let err = store.update(path, record.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    store.create(path, record.clone()).unwrap();
    let err = store.create(path, record).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[test]
fn other_asset_files_are_type_mismatches() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("out")).unwrap();
    std::fs::write(
        dir.path().join("out/Walk.asset"),
        r#"{"guid":"abc","type":"Material"}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("out/Idle.asset"), b"\xff\x00\x13").unwrap();
    std::fs::write(dir.path().join("out/Run.asset"), r#"{"kind":"prefab"}"#).unwrap();

    let mut env = Env::new();
    let mut store = FsAssetStore::new(dir.path());
    for (name, found) in [("Walk", "Material"), ("Idle", "unknown"), ("Run", "prefab")] {
        let path = Path::new("out").join(format!("{name}.asset"));
        let err = env
            .persist(&mut store, &path, computed(name, 1.0, 0.0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch, "{name}");
        match err {
            DatasetError::TypeMismatch { found: f, .. } => assert_eq!(f, found),
            other => panic!("unexpected error {other:?}"),
        }
    }
    let untouched = std::fs::read_to_string(dir.path().join("out/Walk.asset")).unwrap();
    assert_eq!(untouched, r#"{"guid":"abc","type":"Material"}"#);
}

#[test]
fn malformed_dataset_file_is_a_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Bad.asset"),
        r#"{"kind":"dataset","name":3}"#,
    )
    .unwrap();
    let store = FsAssetStore::new(dir.path());
    let err = store.load(Path::new("Bad.asset")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
}
