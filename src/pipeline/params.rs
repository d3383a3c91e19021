//! Generatieparameters en de bijbehorende benoemde bedieningselementen.
//!
//! [`Params`] is de enige configuratie van een generatiepas. Een host wijzigt
//! hem uitsluitend via [`Params::set`], dat namen en aliassen herkent,
//! waarden begrenst en op de stapgrootte afrondt.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::SubdOptions;

/// Weergavemodus van het materiaal van een mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MaterialMode {
    /// Onbelicht, vaste kleur.
    #[default]
    Basic,
    /// Normalen als kleur of belicht standaardmateriaal; de renderer kiest.
    Normal,
}

impl MaterialMode {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Basic => 1,
            Self::Normal => 2,
        }
    }

}

impl TryFrom<u8> for MaterialMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Normal),
            other => Err(format!("onbekende materiaalmodus {other} (verwacht 1 of 2)")),
        }
    }
}

impl From<MaterialMode> for u8 {
    fn from(mode: MaterialMode) -> Self {
        mode.code()
    }
}

/// Materiaalinstellingen die aan iedere gegenereerde mesh meegegeven worden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshMaterial {
    pub mode: MaterialMode,
    pub wireframe: bool,
    pub uv_check: bool,
    /// Textuurherhaling `[x, y]`; UV's zelf blijven binnen `[0, 1]`.
    pub repeat: [f64; 2],
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Params::default().material()
    }
}

/// Fouten bij het wijzigen of inlezen van parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("onbekende parameter `{name}`{}", suggestion_hint(.suggestion.as_deref()))]
    Unknown {
        name: String,
        suggestion: Option<&'static str>,
    },
    #[error("parameter `{name}` verwacht een {expected}")]
    TypeMismatch {
        name: &'static str,
        expected: ControlKind,
    },
    #[error("waarde voor `{name}` moet een eindig getal zijn")]
    NonFinite { name: &'static str },
    #[error("ongeldige parameterconfiguratie: {0}")]
    Json(String),
}

fn suggestion_hint(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (bedoelde je `{s}`?)"))
}

/// Soort waarde die een bedieningselement aanneemt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Integer,
    Number,
    Boolean,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Integer => "geheel getal",
            Self::Number => "getal",
            Self::Boolean => "booleaanse waarde",
        };
        f.write_str(label)
    }
}

/// Waarde voor [`Params::set`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Bool(bool),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Beschrijving van één bedieningselement, voor het genereren van UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSpec {
    pub name: &'static str,
    pub kind: ControlKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    pub value: ParamValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loop,
    Split,
    Smooth,
    Edge,
    Flat,
    MaxTriangles,
    InfiniteTriangles,
    Material,
    Wireframe,
    UvCheck,
    RepeatX,
    RepeatY,
}

struct Control {
    name: &'static str,
    aliases: &'static [&'static str],
    field: Field,
    kind: ControlKind,
    bounds: Option<(f64, f64, f64)>,
}

impl Control {
    const fn toggle(name: &'static str, aliases: &'static [&'static str], field: Field) -> Self {
        Self {
            name,
            aliases,
            field,
            kind: ControlKind::Boolean,
            bounds: None,
        }
    }

    const fn ranged(
        name: &'static str,
        aliases: &'static [&'static str],
        field: Field,
        kind: ControlKind,
        bounds: (f64, f64, f64),
    ) -> Self {
        Self {
            name,
            aliases,
            field,
            kind,
            bounds: Some(bounds),
        }
    }
}

const CONTROLS: &[Control] = &[
    Control::ranged(
        "loop",
        &["iterations"],
        Field::Loop,
        ControlKind::Integer,
        (1.0, 7.0, 1.0),
    ),
    Control::toggle("split", &[], Field::Split),
    Control::toggle("smooth", &["uvsmooth"], Field::Smooth),
    Control::toggle("edge", &["preserveedges"], Field::Edge),
    Control::toggle("flat", &["flatonly"], Field::Flat),
    Control::ranged(
        "maxTriangles",
        &["triangles", "max"],
        Field::MaxTriangles,
        ControlKind::Integer,
        (1_000.0, 100_000.0, 1.0),
    ),
    Control::toggle(
        "infiniteTriangles",
        &["infinite"],
        Field::InfiniteTriangles,
    ),
    Control::ranged(
        "material",
        &[],
        Field::Material,
        ControlKind::Integer,
        (1.0, 2.0, 1.0),
    ),
    Control::toggle("wireframe", &[], Field::Wireframe),
    Control::toggle("uvcheck", &["uvCheck"], Field::UvCheck),
    Control::ranged(
        "repeatX",
        &[],
        Field::RepeatX,
        ControlKind::Number,
        (1.0, 100.0, 1.0),
    ),
    Control::ranged(
        "repeatY",
        &[],
        Field::RepeatY,
        ControlKind::Number,
        (1.0, 100.0, 1.0),
    ),
];

/// Hoogste iteratiewaarde die via configuratie geaccepteerd wordt.
pub const MAX_LOOP: u32 = 7;

/// De configuratie van een generatiepas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Params {
    /// Aantal subdivisie-iteraties. 0 laat de mesh ongemoeid.
    #[serde(rename = "loop")]
    pub iterations: u32,
    pub split: bool,
    pub smooth: bool,
    pub edge: bool,
    pub flat: bool,
    #[serde(alias = "triangles", alias = "max")]
    pub max_triangles: u32,
    #[serde(alias = "infinite")]
    pub infinite_triangles: bool,
    pub material: MaterialMode,
    pub wireframe: bool,
    #[serde(rename = "uvcheck", alias = "uvCheck")]
    pub uv_check: bool,
    pub repeat_x: f64,
    pub repeat_y: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            iterations: 2,
            split: true,
            smooth: false,
            edge: false,
            flat: false,
            max_triangles: 25_000,
            infinite_triangles: false,
            material: MaterialMode::Basic,
            wireframe: true,
            uv_check: false,
            repeat_x: 1.0,
            repeat_y: 1.0,
        }
    }
}

impl Params {
    /// Leest parameters uit JSON; ontbrekende velden krijgen hun standaardwaarde
    /// en getallen worden binnen hun grenzen gebracht.
    ///
    /// # Errors
    /// [`ParamError::Json`] bij ongeldige JSON of een onbekende materiaalmodus.
    pub fn from_json_str(json: &str) -> Result<Self, ParamError> {
        let params: Self =
            serde_json::from_str(json).map_err(|err| ParamError::Json(err.to_string()))?;
        Ok(params.sanitized())
    }

    /// Begrenst alle numerieke velden. `loop` mag hier 0 zijn.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.iterations = self.iterations.min(MAX_LOOP);
        let max_triangles =
            snap(f64::from(self.max_triangles), control_bounds(Field::MaxTriangles));
        self.max_triangles = max_triangles as u32;
        self.repeat_x = snap(self.repeat_x, control_bounds(Field::RepeatX));
        self.repeat_y = snap(self.repeat_y, control_bounds(Field::RepeatY));
        self
    }

    /// Wijzigt één parameter via naam of alias (hoofdletterongevoelig).
    ///
    /// Getallen worden begrensd en op de stapgrootte afgerond. Geeft de
    /// canonieke naam van de gewijzigde parameter terug.
    ///
    /// # Errors
    /// Onbekende namen, het verkeerde type waarde of een niet-eindig getal.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<&'static str, ParamError> {
        let control = find_control(name)?;
        let value = value.into();

        match (control.kind, value) {
            (ControlKind::Boolean, ParamValue::Bool(flag)) => {
                self.set_flag(control.field, flag);
            }
            (ControlKind::Integer | ControlKind::Number, ParamValue::Number(number)) => {
                if !number.is_finite() {
                    return Err(ParamError::NonFinite { name: control.name });
                }
                let snapped = snap(number, control.bounds.unwrap_or((number, number, 0.0)));
                self.set_number(control.field, snapped);
            }
            (expected, _) => {
                return Err(ParamError::TypeMismatch {
                    name: control.name,
                    expected,
                });
            }
        }

        Ok(control.name)
    }

    /// Alle bedieningselementen met hun grenzen en huidige waarde.
    #[must_use]
    pub fn controls(&self) -> Vec<ControlSpec> {
        CONTROLS
            .iter()
            .map(|control| ControlSpec {
                name: control.name,
                kind: control.kind,
                min: control.bounds.map(|(min, _, _)| min),
                max: control.bounds.map(|(_, max, _)| max),
                step: control.bounds.map(|(_, _, step)| step),
                value: self.value_of(control.field),
            })
            .collect()
    }

    /// Subdivisie-instellingen voor deze configuratie.
    #[must_use]
    pub fn subd_options(&self) -> SubdOptions {
        SubdOptions {
            iterations: self.iterations as usize,
            split: self.split,
            smooth: self.smooth,
            preserve_edges: self.edge,
            flat: self.flat,
            max_triangles: (!self.infinite_triangles).then_some(self.max_triangles as usize),
        }
    }

    #[must_use]
    pub fn material(&self) -> MeshMaterial {
        MeshMaterial {
            mode: self.material,
            wireframe: self.wireframe,
            uv_check: self.uv_check,
            repeat: [self.repeat_x, self.repeat_y],
        }
    }

    fn set_flag(&mut self, field: Field, flag: bool) {
        match field {
            Field::Split => self.split = flag,
            Field::Smooth => self.smooth = flag,
            Field::Edge => self.edge = flag,
            Field::Flat => self.flat = flag,
            Field::InfiniteTriangles => self.infinite_triangles = flag,
            Field::Wireframe => self.wireframe = flag,
            Field::UvCheck => self.uv_check = flag,
            Field::Loop
            | Field::MaxTriangles
            | Field::Material
            | Field::RepeatX
            | Field::RepeatY => {}
        }
    }

    fn set_number(&mut self, field: Field, value: f64) {
        match field {
            Field::Loop => self.iterations = value as u32,
            Field::MaxTriangles => self.max_triangles = value as u32,
            Field::Material => {
                self.material = MaterialMode::try_from(value as u8).unwrap_or_default();
            }
            Field::RepeatX => self.repeat_x = value,
            Field::RepeatY => self.repeat_y = value,
            Field::Split
            | Field::Smooth
            | Field::Edge
            | Field::Flat
            | Field::InfiniteTriangles
            | Field::Wireframe
            | Field::UvCheck => {}
        }
    }

    fn value_of(&self, field: Field) -> ParamValue {
        match field {
            Field::Loop => ParamValue::Number(f64::from(self.iterations)),
            Field::Split => ParamValue::Bool(self.split),
            Field::Smooth => ParamValue::Bool(self.smooth),
            Field::Edge => ParamValue::Bool(self.edge),
            Field::Flat => ParamValue::Bool(self.flat),
            Field::MaxTriangles => ParamValue::Number(f64::from(self.max_triangles)),
            Field::InfiniteTriangles => ParamValue::Bool(self.infinite_triangles),
            Field::Material => ParamValue::Number(f64::from(self.material.code())),
            Field::Wireframe => ParamValue::Bool(self.wireframe),
            Field::UvCheck => ParamValue::Bool(self.uv_check),
            Field::RepeatX => ParamValue::Number(self.repeat_x),
            Field::RepeatY => ParamValue::Number(self.repeat_y),
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn find_control(name: &str) -> Result<&'static Control, ParamError> {
    let normalized = normalize_name(name);
    let found = CONTROLS.iter().find(|control| {
        normalize_name(control.name) == normalized
            || control.aliases.iter().any(|alias| normalize_name(alias) == normalized)
    });

    found.ok_or_else(|| ParamError::Unknown {
        name: name.trim().to_owned(),
        suggestion: suggest(&normalized),
    })
}

fn suggest(normalized: &str) -> Option<&'static str> {
    CONTROLS
        .iter()
        .flat_map(|control| {
            std::iter::once(control.name)
                .chain(control.aliases.iter().copied())
                .map(move |candidate| {
                    let distance = levenshtein::levenshtein(normalized, &normalize_name(candidate));
                    (control.name, distance)
                })
        })
        .filter(|(_, distance)| *distance <= 3)
        .min_by_key(|(_, distance)| *distance)
        .map(|(name, _)| name)
}

fn control_bounds(field: Field) -> (f64, f64, f64) {
    CONTROLS
        .iter()
        .find(|control| control.field == field)
        .and_then(|control| control.bounds)
        .unwrap_or((f64::NEG_INFINITY, f64::INFINITY, 0.0))
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Begrenst `value` en rondt af op `min + k * step`.
fn snap(value: f64, (min, max, step): (f64, f64, f64)) -> f64 {
    let mut clamped = clamp(value, min, max);
    if step > 0.0 && min.is_finite() {
        clamped = min + ((clamped - min) / step).round() * step;
        clamped = clamp(clamped, min, max);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_subd_options() {
        let options = Params::default().subd_options();
        assert_eq!(options.iterations, 2);
        assert!(options.split);
        assert!(!options.smooth);
        assert_eq!(options.max_triangles, Some(25_000));
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        let mut params = Params::default();
        assert_eq!(params.set("Triangles", 5_000.0).unwrap(), "maxTriangles");
        assert_eq!(params.max_triangles, 5_000);
        assert_eq!(params.set("MAX", 7_000.0).unwrap(), "maxTriangles");
        assert_eq!(params.max_triangles, 7_000);
        assert_eq!(params.set("infinite", true).unwrap(), "infiniteTriangles");
        assert_eq!(params.subd_options().max_triangles, None);
    }

    #[test]
    fn numbers_are_clamped_and_snapped() {
        let mut params = Params::default();
        params.set("loop", 12.0).unwrap();
        assert_eq!(params.iterations, 7);
        params.set("loop", 0.0).unwrap();
        assert_eq!(params.iterations, 1);
        params.set("loop", 3.4).unwrap();
        assert_eq!(params.iterations, 3);
        params.set("maxTriangles", 10.0).unwrap();
        assert_eq!(params.max_triangles, 1_000);
        params.set("repeatX", 2.6).unwrap();
        assert_eq!(params.repeat_x, 3.0);
        params.set("material", 9.0).unwrap();
        assert_eq!(params.material, MaterialMode::Normal);
    }

    #[test]
    fn unknown_names_get_a_suggestion() {
        let mut params = Params::default();
        let err = params.set("wirefrme", true).unwrap_err();
        assert_eq!(
            err,
            ParamError::Unknown {
                name: "wirefrme".to_owned(),
                suggestion: Some("wireframe"),
            }
        );
        assert!(err.to_string().contains("bedoelde je `wireframe`"));

        let err = params.set("zzzzzzzzzzzz", 1.0).unwrap_err();
        assert!(matches!(err, ParamError::Unknown { suggestion: None, .. }));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut params = Params::default();
        let err = params.set("split", 1.0).unwrap_err();
        assert_eq!(
            err,
            ParamError::TypeMismatch {
                name: "split",
                expected: ControlKind::Boolean,
            }
        );
        assert!(params.set("loop", true).is_err());
        assert_eq!(params, Params::default());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let mut params = Params::default();
        assert_eq!(
            params.set("repeatY", f64::NAN),
            Err(ParamError::NonFinite { name: "repeatY" })
        );
    }

    #[test]
    fn json_uses_control_names() {
        let params = Params::from_json_str(
            r#"{"loop": 0, "split": false, "triangles": 50, "uvcheck": true,
                "material": 2, "repeatX": 4}"#,
        )
        .unwrap();
        assert_eq!(params.iterations, 0);
        assert!(!params.split);
        assert_eq!(params.max_triangles, 1_000);
        assert!(params.uv_check);
        assert_eq!(params.material, MaterialMode::Normal);
        assert_eq!(params.repeat_x, 4.0);
        assert_eq!(params.repeat_y, 1.0);

        let json = serde_json::to_value(Params::default()).unwrap();
        assert_eq!(json["loop"], 2);
        assert_eq!(json["maxTriangles"], 25_000);
        assert_eq!(json["material"], 1);
    }

    #[test]
    fn json_rejects_unknown_material() {
        assert!(matches!(Params::from_json_str(r#"{"material": 3}"#), Err(ParamError::Json(_))));
    }

    #[test]
    fn controls_list_every_parameter() {
        let controls = Params::default().controls();
        assert_eq!(controls.len(), 12);
        let loop_control = controls.iter().find(|c| c.name == "loop").unwrap();
        assert_eq!(loop_control.min, Some(1.0));
        assert_eq!(loop_control.max, Some(7.0));
        assert_eq!(loop_control.value, ParamValue::Number(2.0));
        let wireframe = controls.iter().find(|c| c.name == "wireframe").unwrap();
        assert_eq!(wireframe.kind, ControlKind::Boolean);
        assert_eq!(wireframe.value, ParamValue::Bool(true));
    }
}
