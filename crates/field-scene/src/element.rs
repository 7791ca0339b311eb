//! Typed scene elements
//!
//! Each raw JSON element is checked on its own; a bad element yields an
//! [`ElementError`] naming its index and the first problem found.

use crate::error::ElementError;
use field_physics::{
    ChargedCylinder, ChargedLine, ChargedPlane, ChargedSphere, Distribution, FieldLineCount,
    GaussianCylinder, GaussianSphere, GaussianSurface, PointCharge, SeedPoint, MAX_FIELD_LINES,
};
use glam::DVec3;
use serde_json::{Map, Value};

/// A validated element.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Charge(PointCharge),
    Distribution(Distribution),
    Surface(GaussianSurface),
}

/// A parsed element plus the control it is bound to, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedElement {
    pub element: Element,
    pub bind: Option<String>,
}

/// Field lookup for one element, with its index and kind for error messages.
struct Fields<'a> {
    index: usize,
    kind: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn optional(&self, field: &'static str) -> Result<Option<f64>, ElementError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => number(value).map(Some).ok_or(ElementError::NotANumber {
                index: self.index,
                kind: self.kind,
                field,
            }),
        }
    }

    fn required(&self, field: &'static str) -> Result<f64, ElementError> {
        self.optional(field)?.ok_or(ElementError::MissingField {
            index: self.index,
            kind: self.kind,
            field,
        })
    }

    /// First present key of `names`; errors name the first one.
    fn required_any(&self, names: &[&'static str]) -> Result<f64, ElementError> {
        for &name in names {
            if let Some(v) = self.optional(name)? {
                return Ok(v);
            }
        }
        Err(ElementError::MissingField {
            index: self.index,
            kind: self.kind,
            field: names[0],
        })
    }

    fn point(&self, x: &'static str, y: &'static str, z: &'static str) -> Result<DVec3, ElementError> {
        Ok(DVec3::new(self.required(x)?, self.required(y)?, self.required(z)?))
    }

    fn string(&self, field: &str) -> Option<String> {
        self.map.get(field).and_then(Value::as_str).map(str::to_string)
    }

    /// Optional value that must lie in `0..=max`.
    fn bounded(&self, field: &'static str, max: f64) -> Result<Option<f64>, ElementError> {
        match self.optional(field)? {
            Some(v) if !(0.0..=max).contains(&v) => Err(ElementError::OutOfRange {
                index: self.index,
                kind: self.kind,
                field,
            }),
            v => Ok(v),
        }
    }

    fn lines(&self) -> Result<FieldLineCount, ElementError> {
        let density = self.bounded("field line density", f64::MAX)?;
        let explicit = self
            .bounded("nfieldlines", MAX_FIELD_LINES as f64)?
            .map(|n| n.round() as usize);
        Ok(FieldLineCount::new(density, explicit))
    }
}

/// Accept JSON numbers and numeric strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Charge,
    ChargedLine,
    ChargedPlane,
    ChargedCylinder,
    ChargedSphere,
    GaussianCylinder,
    GaussianSphere,
}

impl Kind {
    const ALL: [Kind; 7] = [
        Kind::Charge,
        Kind::ChargedLine,
        Kind::ChargedPlane,
        Kind::ChargedCylinder,
        Kind::ChargedSphere,
        Kind::GaussianCylinder,
        Kind::GaussianSphere,
    ];

    fn label(self) -> &'static str {
        match self {
            Kind::Charge => "charge",
            Kind::ChargedLine => "charged line",
            Kind::ChargedPlane => "charged plane",
            Kind::ChargedCylinder => "charged cylinder",
            Kind::ChargedSphere => "charged sphere",
            Kind::GaussianCylinder => "gaussian cylinder",
            Kind::GaussianSphere => "gaussian sphere",
        }
    }

    /// Case and surrounding whitespace are ignored.
    fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.label() == name)
    }
}

impl ParsedElement {
    /// Validate element `index`. Keys are expected lowercased.
    pub fn parse(index: usize, value: &Value) -> Result<Self, ElementError> {
        let map = value
            .as_object()
            .ok_or(ElementError::NotAnObject { index })?;
        let raw_kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ElementError::MissingType { index })?;
        let kind = Kind::parse(raw_kind).ok_or_else(|| ElementError::UnknownType {
            index,
            kind: raw_kind.to_string(),
        })?;
        let f = Fields {
            index,
            kind: kind.label(),
            map,
        };
        let name = f.string("name");

        let element = match kind {
            Kind::Charge => {
                let mut charge =
                    PointCharge::new(f.required("charge")?, f.point("x", "y", "z")?).with_lines(f.lines()?);
                charge.name = name;
                Element::Charge(charge)
            }
            Kind::ChargedLine => {
                let line = ChargedLine::new(
                    f.point("x0", "y0", "z0")?,
                    f.point("x1", "y1", "z1")?,
                    f.required("charge density")?,
                );
                Element::Distribution(named(line.into(), name).with_lines(f.lines()?))
            }
            Kind::ChargedPlane => {
                let corners = [
                    f.point("x0", "y0", "z0")?,
                    f.point("x1", "y1", "z1")?,
                    f.point("x2", "y2", "z2")?,
                    f.point("x3", "y3", "z3")?,
                ];
                let plane = ChargedPlane::new(corners, f.required("charge density")?);
                Element::Distribution(named(plane.into(), name).with_lines(f.lines()?))
            }
            Kind::ChargedCylinder => {
                let cylinder = ChargedCylinder::new(
                    f.point("x0", "y0", "z0")?,
                    f.point("x1", "y1", "z1")?,
                    f.required_any(&["r0", "a"])?,
                    f.required_any(&["r1", "b"])?,
                    f.required("charge density")?,
                );
                Element::Distribution(named(cylinder.into(), name).with_lines(f.lines()?))
            }
            Kind::ChargedSphere => {
                let center = f.point("x", "y", "z")?;
                let inner = f.optional("r0")?.or(f.optional("a")?).unwrap_or(0.0);
                let outer = f.required_any(&["r1", "b", "r"])?;
                let sphere = match (f.optional("charge")?, f.optional("charge density")?) {
                    (Some(q), _) => ChargedSphere::new(center, inner, outer, q),
                    (None, Some(rho)) => ChargedSphere::with_density(center, inner, outer, rho),
                    (None, None) => {
                        return Err(ElementError::MissingField {
                            index,
                            kind: f.kind,
                            field: "charge",
                        })
                    }
                };
                Element::Distribution(named(sphere.into(), name).with_lines(f.lines()?))
            }
            Kind::GaussianCylinder => {
                let mut surface = GaussianCylinder::new(
                    f.point("x0", "y0", "z0")?,
                    f.point("x1", "y1", "z1")?,
                    f.required_any(&["r", "r1"])?,
                );
                surface.name = name;
                Element::Surface(GaussianSurface::Cylinder(surface))
            }
            Kind::GaussianSphere => {
                let mut surface =
                    GaussianSphere::new(f.point("x", "y", "z")?, f.required_any(&["r", "r1"])?);
                surface.name = name;
                Element::Surface(GaussianSurface::Sphere(surface))
            }
        };

        Ok(Self {
            element,
            bind: f.string("bind"),
        })
    }
}

fn named(distribution: Distribution, name: Option<String>) -> Distribution {
    match name {
        Some(name) => distribution.named(name),
        None => distribution,
    }
}

/// Explicit start point; `sign` defaults to `+1`.
pub fn parse_start_point(index: usize, value: &Value) -> Result<SeedPoint, ElementError> {
    let coordinate = |field: &'static str| {
        value
            .get(field)
            .and_then(number)
            .ok_or(ElementError::StartPoint { index, field })
    };
    let sign = value.get("sign").and_then(number).unwrap_or(1.0);
    Ok(SeedPoint::new(
        coordinate("x")?,
        coordinate("y")?,
        coordinate("z")?,
        sign,
    ))
}
