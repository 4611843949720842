use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use std::hint::black_box;
use std::path::PathBuf;
use windpath_lib::{
    load_environment, plan_route, search, CostOptions, Environment, EnvironmentBuilder, Position,
    RouteRequest, ScenarioSet, SearchOptions, VehicleConfig, WindVector,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

static URBAN: Lazy<Environment> = Lazy::new(|| {
    let dir = fixtures_dir();
    load_environment(
        &dir.join("urban_geometry.json"),
        &dir.join("urban_velocity.csv"),
    )
    .expect("fixture loads")
});

static LARGE: Lazy<Environment> = Lazy::new(|| {
    EnvironmentBuilder::new(200, 200, 1.0)
        .wind_fn(|p| WindVector::new((p.y / 20.0).sin() * 3.0, (p.x / 20.0).cos() * 3.0))
        .build()
        .expect("synthetic grid builds")
});

static SCENARIO_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    let set = ScenarioSet::builtin();
    let scenario = set.get("Scenario_1").expect("builtin scenario");
    RouteRequest::new(
        scenario.waypoints.clone(),
        SearchOptions::new(CostOptions::energy(VehicleConfig::default())),
    )
});

fn benchmark_pathfinding(c: &mut Criterion) {
    let urban = &*URBAN;
    let large = &*LARGE;

    c.bench_function("urban_scenario_energy", |b| {
        let request = &*SCENARIO_REQUEST;
        b.iter(|| {
            let plan = plan_route(urban, request).expect("route exists");
            black_box(plan.path.len())
        });
    });

    c.bench_function("large_grid_distance", |b| {
        let options = SearchOptions::default();
        b.iter(|| {
            let outcome = search(
                Position::new(0.0, 0.0),
                Position::new(199.0, 150.0),
                large,
                &options,
            )
            .expect("search runs");
            black_box(outcome.is_found())
        });
    });

    c.bench_function("large_grid_energy", |b| {
        let options = SearchOptions::new(CostOptions::energy(VehicleConfig::default()));
        b.iter(|| {
            let outcome = search(
                Position::new(0.0, 0.0),
                Position::new(199.0, 150.0),
                large,
                &options,
            )
            .expect("search runs");
            black_box(outcome.is_found())
        });
    });

    c.bench_function("snap_urban", |b| {
        b.iter(|| black_box(urban.snap(Position::new(-1.25, -0.25)).ok()));
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
