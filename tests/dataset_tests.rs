use std::fs;
use std::path::Path;

use qmx::dataset::{
    DatasetContainer, FeatureConfig, Featurizer, FeaturizeOutput, LoadOptions,
};
use qmx::error::Error;
use tempdir::TempDir;

/// Builds one QM9-style XYZ file. Every heavy atom is written as carbon
/// with enough hydrogens to make the SMILES plausible; `props` land on the
/// scalar-property line after the id.
fn write_xyz(dir: &Path, id: u32, smiles: &str, elements: &[&str], props: &[f64]) {
    let mut contents = format!("{}\n", elements.len());
    let prop_cols: Vec<String> = props.iter().map(|p| format!("{}", p)).collect();
    contents.push_str(&format!("gdb {} {}\n", id, prop_cols.join(" ")));
    for element in elements {
        contents.push_str(&format!("{} 0.0 0.0 0.0 0.0\n", element));
    }
    contents.push_str("100.0 200.0 300.0\n");
    contents.push_str(&format!("{} {}\n", smiles, smiles));
    fs::write(dir.join(format!("dsgdb9nsd_{:06}.xyz", id)), contents).unwrap();
}

fn write_electronic(path: &Path, ids: &[u32]) {
    let mut contents = String::from("# E1 E2 f1 f2 per method\n");
    for &id in ids {
        let cols: Vec<String> = (0..16).map(|c| format!("{}.{}", id, c)).collect();
        contents.push_str(&format!("{} {}\n", id, cols.join(" ")));
    }
    fs::write(path, contents).unwrap();
}

fn loose_options() -> LoadOptions {
    LoadOptions {
        min_heavy_atoms: 1,
        max_heavy_atoms: 9,
        ..LoadOptions::default()
    }
}

#[test]
fn load_populates_raw_and_reports_faults() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "C", &["C", "H", "H", "H", "H"], &[1.0, 2.0]);
    // Declares three atoms but carries two; contributes a fault, no record.
    fs::write(
        dir.path().join("broken.xyz"),
        "3\ngdb 9 1.0\nC 0.0 0.0 0.0\nH 1.0 0.0 0.0\n100.0\nC C\n",
    )
    .unwrap();

    let mut container = DatasetContainer::new();
    let report = container.load(Some(dir.path()), &loose_options()).unwrap();

    assert_eq!(container.raw().len(), 1);
    assert_eq!(report.n_kept, 1);
    assert_eq!(report.faults.len(), 1);
    assert!(matches!(
        report.faults[0].error,
        Error::MalformedRecord { .. }
    ));
}

#[test]
fn heavy_atom_filter_bounds_are_inclusive() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "C", &["C", "H", "H", "H", "H"], &[1.0]);
    write_xyz(dir.path(), 2, "CCC", &["C", "C", "C", "H"], &[1.0]);
    write_xyz(dir.path(), 3, "CCCCC", &["C", "C", "C", "C", "C", "H"], &[1.0]);

    let mut container = DatasetContainer::new();
    let options = LoadOptions {
        min_heavy_atoms: 2,
        max_heavy_atoms: 4,
        ..LoadOptions::default()
    };
    let report = container.load(Some(dir.path()), &options).unwrap();

    assert_eq!(report.n_filtered, 2);
    assert_eq!(container.raw().len(), 1);
    assert!(container.raw().contains_key(&2));
}

#[test]
fn zwitterions_are_dropped_unless_kept() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "[NH3+]C[O-]", &["N", "C", "O"], &[1.0]);
    write_xyz(dir.path(), 2, "CN", &["C", "N"], &[1.0]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();
    assert_eq!(container.raw().len(), 1);
    assert!(container.raw().contains_key(&2));

    let mut keeping = DatasetContainer::new();
    let options = LoadOptions {
        keep_zwitter: true,
        ..loose_options()
    };
    keeping.load(Some(dir.path()), &options).unwrap();
    assert_eq!(keeping.raw().len(), 2);
}

#[test]
fn load_without_path_or_environment_is_a_configuration_error() {
    std::env::remove_var("QM9_DATA_PATH");
    let mut container = DatasetContainer::new();
    let err = container.load(None, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::ConfigurationMissing(_)));
}

#[test]
fn electronic_join_intersects_identifier_spaces() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    for id in [1, 2, 3] {
        write_xyz(dir.path(), id, "CO", &["C", "O"], &[1.0]);
    }
    let ep_path = dir.path().join("qm8.txt");
    write_electronic(&ep_path, &[2, 3, 4]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();
    container
        .load_electronic_properties(Some(&ep_path), None)
        .unwrap();

    let featurizer = Featurizer::ElectronicJoin {
        scale_targets: false,
    };
    container
        .featurize(&featurizer, &FeatureConfig::default())
        .unwrap();

    let ml_data = container.ml_data().unwrap();
    assert_eq!(ml_data.len(), 2);
    let ids: Vec<u32> = ml_data.iter().map(|e| e.qmx_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn electronic_join_without_table_is_not_ready_and_mutates_nothing() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "CO", &["C", "O"], &[1.0]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();

    let featurizer = Featurizer::ElectronicJoin {
        scale_targets: false,
    };
    let err = container
        .featurize(&featurizer, &FeatureConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotReady(_)));
    assert!(container.ml_data().is_err());
    assert!(container.class_cardinalities().is_none());
}

#[test]
fn scalar_property_featurizer_selects_targets() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "CO", &["C", "O"], &[10.0, 20.0, 30.0]);
    write_xyz(dir.path(), 2, "CN", &["C", "N"], &[40.0, 50.0, 60.0]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();

    let featurizer = Featurizer::ScalarProperties {
        target_indices: vec![0, 2],
        scale_targets: false,
    };
    container
        .featurize(&featurizer, &FeatureConfig::default())
        .unwrap();

    let ml_data = container.ml_data().unwrap();
    assert_eq!(ml_data.len(), 2);
    assert_eq!(ml_data[0].target, vec![10.0, 30.0]);
    assert_eq!(ml_data[1].target, vec![40.0, 60.0]);

    let cards = container.class_cardinalities().unwrap();
    assert_eq!(cards.atom_features, vec![5, 3]);
    assert_eq!(cards.bond_features, vec![4]);
}

#[test]
fn featurization_is_idempotent() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "CO", &["C", "O"], &[10.0, 20.0]);
    write_xyz(dir.path(), 2, "CN", &["C", "N"], &[30.0, 40.0]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();

    let featurizer = Featurizer::ScalarProperties {
        target_indices: vec![0, 1],
        scale_targets: false,
    };
    container
        .featurize(&featurizer, &FeatureConfig::default())
        .unwrap();
    let first = container.ml_data().unwrap().to_vec();

    container
        .featurize(&featurizer, &FeatureConfig::default())
        .unwrap();
    assert_eq!(container.ml_data().unwrap(), &first[..]);
}

#[test]
fn target_scaling_returns_the_transform_metadata() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "CO", &["C", "O"], &[1.0]);
    write_xyz(dir.path(), 2, "CN", &["C", "N"], &[3.0]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();

    let featurizer = Featurizer::ScalarProperties {
        target_indices: vec![0],
        scale_targets: true,
    };
    let outcome = container
        .featurize(&featurizer, &FeatureConfig::default())
        .unwrap();

    let scaling = match outcome {
        FeaturizeOutput::MlData { scaling, .. } => scaling.unwrap(),
        _ => panic!("expected ml_data output"),
    };
    assert_eq!(scaling.mean, vec![2.0]);
    assert_eq!(scaling.std, vec![1.0]);

    let ml_data = container.ml_data().unwrap();
    assert_eq!(ml_data[0].target, vec![-1.0]);
    assert_eq!(ml_data[1].target, vec![1.0]);
}

#[test]
fn graph_only_mode_leaves_ml_data_untouched() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "CO", &["C", "O"], &[1.0]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();

    let outcome = container
        .featurize(&Featurizer::GraphOnly, &FeatureConfig::default())
        .unwrap();
    match outcome {
        FeaturizeOutput::Graphs {
            graphs,
            cardinalities,
        } => {
            assert_eq!(graphs.len(), 1);
            assert_eq!(graphs[&1].node_features.len(), 2);
            assert_eq!(cardinalities.atom_features, vec![5, 3]);
        }
        _ => panic!("expected graph output"),
    }
    assert!(container.ml_data().is_err());
}

#[test]
fn snapshot_round_trips_the_full_container() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    for id in [1, 2, 3] {
        write_xyz(dir.path(), id, "CC(=O)N", &["C", "C", "O", "N"], &[1.5, 2.5]);
    }
    let ep_path = dir.path().join("qm8.txt");
    write_electronic(&ep_path, &[1, 2]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();
    container
        .load_electronic_properties(Some(&ep_path), None)
        .unwrap();
    container
        .featurize(
            &Featurizer::ElectronicJoin {
                scale_targets: false,
            },
            &FeatureConfig::default(),
        )
        .unwrap();

    let snapshot_path = dir.path().join("container.json");
    container.write_snapshot(&snapshot_path).unwrap();
    let restored = DatasetContainer::read_snapshot(&snapshot_path).unwrap();

    assert_eq!(restored, container);

    // Re-serializing the restored container yields identical bytes.
    let second_path = dir.path().join("container2.json");
    restored.write_snapshot(&second_path).unwrap();
    assert_eq!(
        fs::read(&snapshot_path).unwrap(),
        fs::read(&second_path).unwrap()
    );
}

#[test]
fn structure_counts_follow_the_pattern_library() {
    let dir = TempDir::new("qmx-dataset").unwrap();
    write_xyz(dir.path(), 1, "c1ccccc1", &["C"; 6], &[1.0]);
    write_xyz(dir.path(), 2, "CC#N", &["C", "C", "N"], &[1.0]);
    write_xyz(dir.path(), 3, "CC", &["C", "C"], &[1.0]);

    let mut container = DatasetContainer::new();
    container.load(Some(dir.path()), &loose_options()).unwrap();

    let counts = container.structure_counts(Some(6));
    assert_eq!(counts.num_aromatic, 1);
    assert_eq!(counts.num_triple_bond, 1);
    assert_eq!(counts.num_hetero_bond, 1);
    assert_eq!(counts.num_ring, 1);
}
