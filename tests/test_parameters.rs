use bayesnet::{BayesError, DataColumn, DataTable, Dag, EstimationMethod, NetworkKind};

const TEST_MODELSTRING: &str = "[A][B|C:D][C|D][D]";

fn test_dag() -> Dag {
    Dag::from_modelstring(TEST_MODELSTRING).unwrap()
}

#[test]
fn test_generate_levels_within_bounds() {
    let mut dag = test_dag();
    dag.generate_levels(Some(2), Some(4), Some(9)).unwrap();
    for node in ["A", "B", "C", "D"] {
        let levels = dag.levels(node).unwrap().unwrap();
        assert!((2..=4).contains(&levels.len()));
    }
    assert!(dag.generate_levels(Some(1), Some(3), None).is_err());
    assert!(dag.generate_levels(Some(3), Some(2), None).is_err());
}

#[test]
fn test_generate_discrete_parameters_rows_sum_to_one() {
    let mut dag = test_dag();
    dag.generate_discrete_parameters(None, None, None, true, Some(31))
        .unwrap();
    assert_eq!(dag.dtype(), Some(NetworkKind::Discrete));
    for node in ["A", "B", "C", "D"] {
        let cpt = dag.cpd(node).unwrap().unwrap().as_table().unwrap();
        for row in cpt.probabilities().rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
            assert!(row.iter().all(|&p| p >= 0.0));
        }
    }
    // B conditions on both sorted parents
    let cpt = dag.cpd("B").unwrap().unwrap().as_table().unwrap();
    assert_eq!(cpt.parents(), ["C".to_string(), "D".to_string()]);
}

#[test]
fn test_generate_discrete_respects_preset_levels() {
    let mut dag = Dag::from_modelstring("[A]").unwrap();
    dag.set_levels("A", vec!["no".to_string(), "maybe".to_string(), "yes".to_string()])
        .unwrap();
    dag.generate_discrete_parameters(None, None, None, true, Some(2))
        .unwrap();
    let cpt = dag.cpd("A").unwrap().unwrap().as_table().unwrap();
    assert_eq!(cpt.levels().len(), 3);
}

#[test]
fn test_generate_continuous_parameters() {
    let mut dag = test_dag();
    dag.generate_continuous_parameters(Some(&[1.0, -1.0]), Some(0.5), Some(2.0), Some(7))
        .unwrap();
    assert_eq!(dag.dtype(), Some(NetworkKind::Continuous));
    let cpd = dag.cpd("B").unwrap().unwrap().as_distribution().unwrap();
    assert_eq!(cpd.parents(), ["C".to_string(), "D".to_string()]);
    assert_eq!(cpd.mean(), 0.5);
    assert_eq!(cpd.std(), 2.0);
    assert!(cpd.weights().iter().all(|w| [1.0, -1.0].contains(w)));
}

#[test]
fn test_dtype_mixed_and_none() {
    let dag = test_dag();
    assert_eq!(dag.dtype(), None);
}

#[test]
fn test_estimate_requires_levels_or_inference() {
    let mut dag = Dag::from_modelstring("[A][B|A]").unwrap();
    let mut data = DataTable::new();
    data.push_column("A", DataColumn::Int(vec![0, 0, 1, 1]))
        .unwrap();
    data.push_column("B", DataColumn::Int(vec![0, 1, 0, 1]))
        .unwrap();
    assert!(matches!(
        dag.estimate_parameters(&data, EstimationMethod::MaximumLikelihood, false),
        Err(BayesError::MissingLevels(_))
    ));
    dag.estimate_parameters(&data, EstimationMethod::MaximumLikelihood, true)
        .unwrap();
    assert_eq!(dag.dtype(), Some(NetworkKind::Discrete));
}

#[test]
fn test_estimate_recovers_conditional_frequencies() {
    let mut dag = Dag::from_modelstring("[A][B|A]").unwrap();
    let mut data = DataTable::new();
    data.push_column(
        "A",
        DataColumn::Str(
            ["a0", "a0", "a0", "a0", "a1", "a1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
    )
    .unwrap();
    data.push_column(
        "B",
        DataColumn::Str(
            ["b0", "b0", "b1", "b1", "b0", "b0"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
    )
    .unwrap();
    dag.estimate_parameters(&data, EstimationMethod::MaximumLikelihood, true)
        .unwrap();

    assert_eq!(dag.levels("A").unwrap().unwrap(), ["a0".to_string(), "a1".to_string()]);
    let cpt = dag.cpd("B").unwrap().unwrap().as_table().unwrap();
    // P(B=b0 | A=a0) = 0.5, P(B=b0 | A=a1) = 1.0
    assert!((cpt.probabilities()[[0, 0]] - 0.5).abs() < 1e-9);
    assert!((cpt.probabilities()[[1, 0]] - 1.0).abs() < 1e-9);
}

#[test]
fn test_estimate_rejects_real_columns_for_discrete_nodes() {
    let mut dag = Dag::from_modelstring("[A]").unwrap();
    let mut data = DataTable::new();
    data.push_column("A", DataColumn::Real(vec![0.1, 0.2]))
        .unwrap();
    assert!(matches!(
        dag.estimate_parameters(&data, EstimationMethod::MaximumLikelihood, true),
        Err(BayesError::UnsupportedColumnType { .. })
    ));
}

#[test]
fn test_estimate_with_pseudocounts_covers_unseen_configurations() {
    let mut dag = Dag::from_modelstring("[A][B|A]").unwrap();
    dag.set_levels("A", vec!["0".to_string(), "1".to_string()])
        .unwrap();
    dag.set_levels("B", vec!["0".to_string(), "1".to_string()])
        .unwrap();
    let mut data = DataTable::new();
    // A=1 never observed
    data.push_column("A", DataColumn::Int(vec![0, 0, 0, 0]))
        .unwrap();
    data.push_column("B", DataColumn::Int(vec![0, 0, 1, 1]))
        .unwrap();
    dag.estimate_parameters(&data, EstimationMethod::Bayes { pseudocount: 1.0 }, false)
        .unwrap();
    let cpt = dag.cpd("B").unwrap().unwrap().as_table().unwrap();
    // Unseen configuration falls back to the prior: (0+1)/(0+2)
    assert!((cpt.probabilities()[[1, 0]] - 0.5).abs() < 1e-9);
    // Seen configuration is smoothed: (2+1)/(4+2)
    assert!((cpt.probabilities()[[0, 0]] - 0.5).abs() < 1e-9);
}

#[test]
fn test_estimation_round_trip_from_sampled_data() {
    let mut dag = Dag::from_modelstring("[A][B|A]").unwrap();
    dag.generate_discrete_parameters(Some(30.0), Some(2), Some(2), false, Some(41))
        .unwrap();
    let table = dag.sample(20_000, Some(42)).unwrap();

    let mut refit = Dag::from_modelstring("[A][B|A]").unwrap();
    refit
        .estimate_parameters(&table, EstimationMethod::MaximumLikelihood, true)
        .unwrap();

    let truth = dag.cpd("B").unwrap().unwrap().as_table().unwrap();
    let learnt = refit.cpd("B").unwrap().unwrap().as_table().unwrap();
    for (t_row, l_row) in truth
        .probabilities()
        .rows()
        .into_iter()
        .zip(learnt.probabilities().rows())
    {
        for (t, l) in t_row.iter().zip(l_row) {
            assert!((t - l).abs() < 0.05, "true {t} vs learnt {l}");
        }
    }
}

#[test]
fn test_copies_do_not_alias_parameters() {
    let mut dag = test_dag();
    dag.generate_discrete_parameters(None, None, None, true, Some(3))
        .unwrap();
    let mut copy = dag.clone();
    copy.remove_node("D").unwrap();

    // The copy's B lost a parent; the original's B is untouched
    let copied = copy.cpd("B").unwrap().unwrap().as_table().unwrap();
    assert_eq!(copied.parents(), ["C".to_string()]);
    let original = dag.cpd("B").unwrap().unwrap().as_table().unwrap();
    assert_eq!(original.parents(), ["C".to_string(), "D".to_string()]);
}
