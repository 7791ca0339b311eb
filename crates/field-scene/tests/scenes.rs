//! Integration tests over the scene files shipped in `scenes/`.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use field_physics::{Mutation, VectorField};
use field_scene::{BindTarget, Scene, SceneConfig, SceneKind, SceneRegistry};
use glam::DVec3;
use std::f64::consts::PI;
use std::path::PathBuf;

fn scene_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "..", "..", "scenes", name]
        .iter()
        .collect()
}

fn load(name: &str) -> Scene {
    SceneConfig::load(scene_path(name))
        .and_then(|config| config.build())
        .unwrap_or_else(|e| panic!("{name}: {e}"))
}

#[test]
fn test_dipole_scene() {
    let scene = load("dipole.json");
    assert_eq!(scene.name.as_deref(), Some("dipole"));
    assert_eq!(scene.kind, SceneKind::ElectricField);
    assert_eq!(scene.charges.charges().len(), 2);
    assert_eq!(scene.surfaces.len(), 1);
    assert_eq!(scene.binding("plus-charge"), Some(BindTarget::Charge(0)));

    // 4 lines per unit charge on each ±2 charge
    assert_eq!(scene.seeds(0.0).len(), 16);
    assert_abs_diff_eq!(scene.charges.total_charge(), 0.0);

    // Gauss's law: the sphere around the positive charge sees 4π·2
    let flux = scene.surfaces[0].flux(&scene.charges, 64);
    assert_relative_eq!(flux, 8.0 * PI, max_relative = 1e-2);
}

#[test]
fn test_capacitor_scene_keys_are_case_insensitive() {
    let scene = load("capacitor.json");
    assert_eq!(scene.name.as_deref(), Some("capacitor"));
    assert_eq!(scene.canvas.as_deref(), Some("main"));
    assert_eq!(scene.scale, 0.5);
    assert!(scene.charges.charges().is_empty());
    assert_eq!(scene.charges.distributions().len(), 3);
    assert_eq!(scene.charges.find_distribution("ball"), Some(2));

    // 16 explicit lines per plate, 3 from the sphere's default density
    assert_eq!(scene.seeds(0.0).len(), 35);
    assert_relative_eq!(scene.charges.total_charge(), 3.0, epsilon = 1e-9);

    // Between the plates the field is 4πσ towards the negative plate, plus a
    // little more pushed down by the sphere four units above
    let e = scene.field().field(DVec3::ZERO);
    assert_relative_eq!(e.z, -2.0 * PI - 3.0 / 16.0, epsilon = 1e-9);

    // The cylinder cuts equal and opposite patches out of the plates
    let flux = scene.surfaces[0].flux(&scene.charges, 64);
    assert_abs_diff_eq!(flux, 0.0, epsilon = 5e-2);
}

#[test]
fn test_vortex_scene() {
    let scene = load("vortex.json");
    assert_eq!(scene.kind, SceneKind::SimpleVectorField);
    assert!(scene.charges.is_empty());

    let seeds = scene.seeds(0.0);
    assert_eq!(seeds.len(), 3);
    assert_eq!(seeds[0].sign, 1.0);
    assert_eq!(seeds[2].sign, -1.0);

    let e = scene.field().field(DVec3::new(2.0, 0.0, 0.0));
    assert_relative_eq!(e.x, 0.0);
    assert_relative_eq!(e.y, 2.0);
}

#[test]
fn test_bound_control_drives_its_charge() {
    let mut registry = SceneRegistry::new();
    let (key, _) = registry.register(load("dipole.json"));
    let scene = registry.get_mut(&key).unwrap();
    scene.charges.take_changes();

    let Some(BindTarget::Charge(index)) = scene.binding("plus-charge") else {
        panic!("plus-charge is not bound to a charge");
    };
    let changes = scene
        .charges
        .apply(Mutation::SetCharge { index, charge: 5.0 })
        .unwrap();
    assert!(changes.charges);
    assert!(!changes.distributions);

    let scene = registry.get(&key).unwrap();
    assert_eq!(scene.charges.charges()[index].charge(), 5.0);
    assert_relative_eq!(scene.charges.total_charge(), 3.0);
}

#[test]
fn test_every_shipped_scene_builds() {
    let mut registry = SceneRegistry::new();
    for name in ["capacitor.json", "dipole.json", "vortex.json"] {
        let config = SceneConfig::load(scene_path(name)).unwrap();
        let (scene, skipped) = config.build_lenient().unwrap();
        assert!(skipped.is_empty(), "{name}: {skipped:?}");
        registry.register(scene);
    }
    assert_eq!(registry.names(), vec!["capacitor", "dipole", "vortex"]);
}

#[test]
fn test_runaway_line_count_fails_the_build() {
    let config = SceneConfig::from_json(
        r#"{"elements": [
            {"type": "charge", "x": 0, "y": 0, "z": 0, "charge": 1, "nfieldlines": 1e20},
            {"type": "charge", "x": 1, "y": 0, "z": 0, "charge": -1}
        ]}"#,
    )
    .unwrap();
    assert!(config.build().is_err());

    let (scene, skipped) = config.build_lenient().unwrap();
    assert_eq!(skipped.len(), 1);
    assert_eq!(scene.seeds(0.0).len(), 2);
}
