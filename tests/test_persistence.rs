use bayesnet::Dag;
use tempfile::tempdir;

#[test]
fn test_save_load_round_trip() {
    let mut dag = Dag::from_modelstring("[A][B|C:D][C|D][D]").unwrap();
    dag.generate_discrete_parameters(None, None, None, true, Some(19))
        .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("network.json");
    dag.save(&path).unwrap();
    let restored = Dag::load(&path).unwrap();

    assert_eq!(restored, dag);
    for node in ["A", "B", "C", "D"] {
        assert_eq!(
            restored.levels(node).unwrap(),
            dag.levels(node).unwrap(),
            "levels of {node}"
        );
        let original = dag.cpd(node).unwrap().unwrap().as_table().unwrap();
        let loaded = restored.cpd(node).unwrap().unwrap().as_table().unwrap();
        assert_eq!(loaded.probabilities(), original.probabilities());
        assert_eq!(loaded.parents(), original.parents());
    }

    // A loaded network samples exactly like the original under one seed
    assert_eq!(
        restored.sample(100, Some(23)).unwrap(),
        dag.sample(100, Some(23)).unwrap()
    );
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempdir().unwrap();
    assert!(Dag::load(&dir.path().join("absent.json")).is_err());
}
