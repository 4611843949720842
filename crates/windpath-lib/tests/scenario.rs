use std::path::PathBuf;

use windpath_lib::{
    load_environment, run_scenario, Environment, Error, Position, ScenarioSet, ScenarioSummary,
    UnreachablePolicy, VehicleConfig,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

fn load_fixture() -> Environment {
    let dir = fixtures_dir();
    load_environment(
        &dir.join("urban_geometry.json"),
        &dir.join("urban_velocity.csv"),
    )
    .expect("fixture loads")
}

fn fixture_scenarios() -> ScenarioSet {
    ScenarioSet::from_path(&fixtures_dir().join("scenarios.json")).expect("scenarios load")
}

#[test]
fn fixture_scenario_matches_builtin() {
    let loaded = fixture_scenarios();
    let builtin = ScenarioSet::builtin();
    assert_eq!(loaded.len(), 2);
    assert_eq!(
        loaded.get("Scenario_1").unwrap(),
        builtin.get("Scenario_1").unwrap()
    );
}

#[test]
fn energy_route_saves_energy_on_fixture() {
    let env = load_fixture();
    let set = fixture_scenarios();
    let vehicle = VehicleConfig::default();

    for scenario in &set.scenarios {
        let report = run_scenario(&env, scenario, &vehicle, UnreachablePolicy::Abort)
            .expect("scenario runs");

        assert!(report.distance.plan.is_complete());
        assert!(report.energy.plan.is_complete());
        assert!(
            report.energy.energy <= report.distance.energy + 1e-9,
            "{}: {} > {}",
            scenario.name,
            report.energy.energy,
            report.distance.energy
        );
        assert!(report.distance.length <= report.energy.length + 1e-9);
        assert!(report.comparison.savings_percent().is_some_and(|s| s >= 0.0));
    }
}

#[test]
fn scenario_one_has_positive_savings() {
    let env = load_fixture();
    let set = ScenarioSet::builtin();
    let scenario = set.get("Scenario_1").unwrap();
    let report = run_scenario(&env, scenario, &VehicleConfig::default(), UnreachablePolicy::Abort)
        .unwrap();

    let savings = report.comparison.savings_percent().unwrap();
    assert!(savings > 0.0, "expected savings, got {savings}");
    assert_eq!(
        report.distance.path().points().first(),
        Some(&Position::new(0.0, -2.5))
    );
    assert_eq!(
        report.energy.path().points().last(),
        Some(&Position::new(-2.5, -2.5))
    );

    let summary = ScenarioSummary::from_report(&report);
    assert_eq!(summary.name, "Scenario_1");
    assert_eq!(summary.savings_percent, Some(savings));
    assert_eq!(summary.energy.path.last(), Some(&Position::new(-2.5, -2.5)));
}

#[test]
fn unknown_scenario_suggests_names() {
    let set = fixture_scenarios();
    let err = set.get("Scenario_3").unwrap_err();
    match &err {
        Error::UnknownScenario { suggestions, .. } => {
            assert!(suggestions.contains(&"Scenario_1".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("unknown scenario: Scenario_3"));
}

#[test]
fn missing_scenario_file_is_reported() {
    let err = ScenarioSet::from_path(&fixtures_dir().join("nope.json")).unwrap_err();
    assert!(matches!(err, Error::DatasetNotFound { .. }));
}

#[test]
fn scenario_with_single_waypoint_is_rejected() {
    let json = r#"{"scenarios": [{"name": "solo", "waypoints": [[0, 0]]}]}"#;
    let err = ScenarioSet::from_reader(json.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn scenarios_are_independent_of_order() {
    let env = load_fixture();
    let set = fixture_scenarios();
    let vehicle = VehicleConfig::default();

    let forward: Vec<f64> = set
        .scenarios
        .iter()
        .map(|s| {
            run_scenario(&env, s, &vehicle, UnreachablePolicy::Abort)
                .unwrap()
                .energy
                .energy
        })
        .collect();
    let mut backward: Vec<f64> = set
        .scenarios
        .iter()
        .rev()
        .map(|s| {
            run_scenario(&env, s, &vehicle, UnreachablePolicy::Abort)
                .unwrap()
                .energy
                .energy
        })
        .collect();
    backward.reverse();
    assert_eq!(forward, backward);
}
