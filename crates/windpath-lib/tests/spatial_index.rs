//! Integration tests for coordinate snapping.

use std::path::PathBuf;

use windpath_lib::{
    load_environment, CellIndex, Environment, EnvironmentBuilder, Error, ObstacleRect, Position,
    SNAP_RADIUS_CELLS,
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

#[test]
fn snap_inside_building_returns_nearest_open_cell() {
    let env = load_fixture();
    // Equidistant from four open cells on either side of the western building.
    let snapped = env.snap(Position::new(-1.25, -0.25)).expect("snaps");
    assert_eq!(snapped, CellIndex::new(4, 1));
    assert!(env.is_traversable(snapped));
}

#[test]
fn snapping_never_yields_an_obstacle() {
    let env = load_fixture();
    let mut y = -2.7;
    while y <= 2.7 {
        let mut x = -2.7;
        while x <= 2.7 {
            let snapped = env.snap(Position::new(x, y)).expect("in-domain point snaps");
            assert!(
                env.is_traversable(snapped),
                "({x}, {y}) snapped onto obstacle {snapped}"
            );
            x += 0.3;
        }
        y += 0.3;
    }
}

#[test]
fn snap_exact_center_is_identity() {
    let env = load_fixture();
    let index = CellIndex::new(7, 4);
    assert_eq!(env.snap(env.center(index)).unwrap(), index);
}

#[test]
fn far_outside_point_is_out_of_domain() {
    let env = load_fixture();
    let err = env.snap(Position::new(50.0, 0.0)).unwrap_err();
    assert!(matches!(err, Error::OutOfDomain { x, y } if x == 50.0 && y == 0.0));
}

#[test]
fn nearby_outside_point_snaps_within_radius() {
    let env = load_fixture();
    let radius = env.spatial_index().snap_radius();
    assert_eq!(radius, SNAP_RADIUS_CELLS * 0.5);

    let snapped = env.snap(Position::new(0.0, 3.2)).expect("within snap radius");
    assert_eq!(snapped, CellIndex::new(10, 5));
}

#[test]
fn non_finite_coordinate_is_out_of_domain() {
    let env = load_fixture();
    assert!(matches!(
        env.snap(Position::new(f64::NAN, 0.0)),
        Err(Error::OutOfDomain { .. })
    ));
}

#[test]
fn fully_blocked_environment_cannot_snap() {
    let env = EnvironmentBuilder::new(3, 3, 1.0)
        .obstacle_rect(ObstacleRect::new(
            Position::new(-1.0, -1.0),
            Position::new(3.0, 3.0),
        ))
        .build()
        .unwrap();
    assert!(env.spatial_index().is_empty());
    assert!(matches!(
        env.snap(Position::new(1.0, 1.0)),
        Err(Error::OutOfDomain { .. })
    ));
}

#[test]
fn within_radius_skips_obstacles() {
    let env = load_fixture();
    let centre = env.center(CellIndex::new(4, 2));
    let results = env.spatial_index().within_radius(centre, 0.6);

    assert!(results.iter().all(|(index, _)| env.is_traversable(*index)));
    assert!(results.windows(2).all(|pair| pair[0].1 <= pair[1].1));
    assert_eq!(results.first().map(|(index, _)| *index), Some(CellIndex::new(4, 1)));
}
