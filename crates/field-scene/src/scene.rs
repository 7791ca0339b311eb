//! Building a scene from its configuration

use crate::config::SceneConfig;
use crate::element::{parse_start_point, Element, ParsedElement};
use crate::error::{ElementError, ElementErrors, SceneError};
use field_physics::{
    ChargeAggregate, GaussianSurface, SeedPoint, VectorField, VectorFunction, DEFAULT_SEED_RADIUS,
};

/// What a scene visualises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneKind {
    /// Field of the scene's charges
    #[default]
    ElectricField,
    /// Formula-defined field, traced from explicit start points
    SimpleVectorField,
}

impl SceneKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "electric field" => Some(SceneKind::ElectricField),
            "simple vector field" => Some(SceneKind::SimpleVectorField),
            _ => None,
        }
    }
}

/// Which object a `bind` control drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindTarget {
    Charge(usize),
    Distribution(usize),
    Surface(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub control: String,
    pub target: BindTarget,
}

/// A validated visualisation.
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: Option<String>,
    pub canvas: Option<String>,
    pub scale: f64,
    pub kind: SceneKind,
    pub charges: ChargeAggregate,
    pub surfaces: Vec<GaussianSurface>,
    pub start_points: Vec<SeedPoint>,
    pub function: Option<VectorFunction>,
    pub bindings: Vec<Binding>,
}

impl Scene {
    /// The field traced for this scene.
    pub fn field(&self) -> &dyn VectorField {
        match (&self.kind, &self.function) {
            (SceneKind::SimpleVectorField, Some(function)) => function,
            _ => &self.charges,
        }
    }

    /// Explicit start points when given, otherwise seeds from every source.
    pub fn seeds(&self, phi0: f64) -> Vec<SeedPoint> {
        if self.start_points.is_empty() {
            self.charges.get_start_points(phi0, DEFAULT_SEED_RADIUS)
        } else {
            self.start_points.clone()
        }
    }

    pub fn binding(&self, control: &str) -> Option<BindTarget> {
        self.bindings
            .iter()
            .find(|b| b.control == control)
            .map(|b| b.target)
    }
}

struct Parts {
    scene: Scene,
    errors: Vec<ElementError>,
}

impl SceneConfig {
    /// Build the scene, failing with every element error when any element is invalid.
    pub fn build(&self) -> Result<Scene, SceneError> {
        let Parts { scene, errors } = self.assemble()?;
        if errors.is_empty() {
            Ok(scene)
        } else {
            Err(SceneError::Elements(ElementErrors(errors)))
        }
    }

    /// Build the scene from the valid elements, logging and skipping the rest.
    ///
    /// Only problems with the scene as a whole (unknown type, bad field
    /// formula) are errors here.
    pub fn build_lenient(&self) -> Result<(Scene, Vec<ElementError>), SceneError> {
        let Parts { scene, errors } = self.assemble()?;
        for error in &errors {
            log::warn!("Skipping {error}");
        }
        Ok((scene, errors))
    }

    fn assemble(&self) -> Result<Parts, SceneError> {
        let kind = match &self.kind {
            Some(name) => SceneKind::parse(name).ok_or_else(|| SceneError::UnknownKind(name.clone()))?,
            None => SceneKind::default(),
        };

        let function = match (kind, &self.field) {
            (SceneKind::SimpleVectorField, None) => return Err(SceneError::MissingFunction),
            (_, Some(f)) => Some(VectorFunction::parse(&f.x, &f.y, &f.z)?),
            (_, None) => None,
        };

        let mut scene = Scene {
            name: self.name.clone(),
            canvas: self.canvas.clone(),
            scale: self.scale.unwrap_or(1.0),
            kind,
            charges: ChargeAggregate::new(),
            surfaces: Vec::new(),
            start_points: Vec::with_capacity(self.start_points.len()),
            function,
            bindings: Vec::new(),
        };
        let mut errors = Vec::new();

        for (index, value) in self.elements.iter().enumerate() {
            let parsed = match ParsedElement::parse(index, value) {
                Ok(parsed) => parsed,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            let target = match parsed.element {
                Element::Charge(charge) => {
                    scene.charges.add_charge(charge);
                    BindTarget::Charge(scene.charges.charges().len() - 1)
                }
                Element::Distribution(distribution) => {
                    scene.charges.add_distribution(distribution);
                    BindTarget::Distribution(scene.charges.distributions().len() - 1)
                }
                Element::Surface(surface) => {
                    scene.surfaces.push(surface);
                    BindTarget::Surface(scene.surfaces.len() - 1)
                }
            };
            if let Some(control) = parsed.bind {
                scene.bindings.push(Binding { control, target });
            }
        }

        for (index, value) in self.start_points.iter().enumerate() {
            match parse_start_point(index, value) {
                Ok(seed) => scene.start_points.push(seed),
                Err(e) => errors.push(e),
            }
        }

        log::debug!(
            "Scene {:?}: {} charges, {} distributions, {} surfaces, {} start points",
            scene.name,
            scene.charges.charges().len(),
            scene.charges.distributions().len(),
            scene.surfaces.len(),
            scene.start_points.len()
        );
        Ok(Parts { scene, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;
    use serde_json::json;

    fn config(value: serde_json::Value) -> SceneConfig {
        SceneConfig::from_value(value).unwrap()
    }

    #[test]
    fn test_build_dipole() {
        let scene = config(json!({
            "name": "dipole",
            "elements": [
                {"type": "charge", "x": -1, "y": 0, "z": 0, "charge": 1, "bind": "left"},
                {"type": "charge", "x": 1, "y": 0, "z": 0, "charge": -1},
                {"type": "gaussian sphere", "x": -1, "y": 0, "z": 0, "r": 0.5}
            ]
        }))
        .build()
        .unwrap();

        assert_eq!(scene.kind, SceneKind::ElectricField);
        assert_eq!(scene.scale, 1.0);
        assert_eq!(scene.charges.charges().len(), 2);
        assert_eq!(scene.surfaces.len(), 1);
        assert_eq!(scene.binding("left"), Some(BindTarget::Charge(0)));
        assert_eq!(scene.seeds(0.0).len(), 4);
        let e = scene.field().field(DVec3::ZERO);
        assert_relative_eq!(e.x, 2.0);
    }

    #[test]
    fn test_strict_build_collects_every_error() {
        let cfg = config(json!({
            "elements": [
                {"type": "charge", "y": 0, "z": 0, "charge": 1},
                {"type": "charge", "x": 0, "y": 0, "z": 0, "charge": 1},
                {"type": "wormhole"}
            ],
            "startPoints": [{"x": 0}]
        }));
        match cfg.build().unwrap_err() {
            SceneError::Elements(ElementErrors(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(matches!(errors[0], ElementError::MissingField { index: 0, .. }));
                assert!(matches!(errors[1], ElementError::UnknownType { index: 2, .. }));
                assert!(matches!(errors[2], ElementError::StartPoint { index: 0, field: "y" }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_lenient_build_skips_bad_elements() {
        let cfg = config(json!({
            "elements": [
                {"type": "charge", "x": 0, "y": 0, "z": 0},
                {"type": "charge", "x": 2, "y": 0, "z": 0, "charge": 3}
            ]
        }));
        let (scene, skipped) = cfg.build_lenient().unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(scene.charges.charges().len(), 1);
        assert_eq!(scene.charges.charges()[0].charge(), 3.0);
    }

    #[test]
    fn test_simple_vector_field() {
        let scene = config(json!({
            "type": "Simple Vector Field",
            "field": {"x": "-y", "y": "x", "z": "0"},
            "startPoints": [{"x": 1, "y": 0, "z": 0}]
        }))
        .build()
        .unwrap();
        assert_eq!(scene.kind, SceneKind::SimpleVectorField);
        assert_eq!(scene.field().field(DVec3::X), DVec3::Y);
        assert_eq!(scene.seeds(0.0), vec![SeedPoint::new(1.0, 0.0, 0.0, 1.0)]);
    }

    #[test]
    fn test_scene_level_errors() {
        assert!(matches!(
            config(json!({"type": "magnetic field"})).build_lenient().unwrap_err(),
            SceneError::UnknownKind(_)
        ));
        assert!(matches!(
            config(json!({"type": "simple vector field"})).build().unwrap_err(),
            SceneError::MissingFunction
        ));
        assert!(matches!(
            config(json!({"type": "simple vector field", "field": {"x": "x +", "y": "0", "z": "0"}}))
                .build()
                .unwrap_err(),
            SceneError::Function(_)
        ));
    }
}
