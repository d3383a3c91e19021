//! Parser voor GeoJSON-invoer met polygoon-footprints.

use ::geojson::{GeoJson, Geometry, Value};
use thiserror::Error;

use crate::geom::{GeoPolygon, LonLat};

/// Result type voor het parsen van GeoJSON-invoer.
pub type InputResult<T> = Result<T, InputError>;

/// Beschrijft fouten tijdens het inlezen van GeoJSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Het document is geen geldige JSON of geen geldige GeoJSON.
    #[error("ongeldig GeoJSON-document: {0}")]
    Json(String),
    /// Een FeatureCollection zonder features.
    #[error("de FeatureCollection bevat geen features")]
    EmptyCollection,
    /// Een positie met minder dan twee (eindige) getallen.
    #[error("ongeldige positie {position} in ring {ring} van polygoon {polygon}: verwacht [lengtegraad, breedtegraad]")]
    InvalidPosition {
        polygon: usize,
        ring: usize,
        position: usize,
    },
}

impl From<::geojson::Error> for InputError {
    fn from(err: ::geojson::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Alle polygonen uit een GeoJSON-document, in documentvolgorde.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoInput {
    pub polygons: Vec<GeoPolygon>,
    /// Aantal geometrieën dat geen (Multi)Polygon is en overgeslagen werd.
    pub ignored_geometries: usize,
}

impl GeoInput {
    /// Bouwt invoer direct uit polygonen, zonder documentvalidatie.
    #[must_use]
    pub fn from_polygons(polygons: Vec<GeoPolygon>) -> Self {
        Self {
            polygons,
            ignored_geometries: 0,
        }
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Leest een GeoJSON-document (Geometry, Feature of FeatureCollection).
///
/// # Errors
/// Geeft [`InputError`] terug voor ongeldige JSON, een lege
/// FeatureCollection of een ongeldige positie.
pub fn parse_str(input: &str) -> InputResult<GeoInput> {
    let document: GeoJson = input.parse()?;

    let geometries: Vec<Geometry> = match document {
        GeoJson::FeatureCollection(collection) => {
            if collection.features.is_empty() {
                return Err(InputError::EmptyCollection);
            }
            collection.features.into_iter().filter_map(|f| f.geometry).collect()
        }
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::Geometry(geometry) => vec![geometry],
    };

    let mut input = GeoInput::default();
    for geometry in &geometries {
        collect_geometry(&geometry.value, &mut input)?;
    }

    log::debug!(
        "GeoJSON ingelezen: {} polygonen, {} genegeerde geometrieën",
        input.polygons.len(),
        input.ignored_geometries
    );

    Ok(input)
}

fn collect_geometry(value: &Value, input: &mut GeoInput) -> InputResult<()> {
    match value {
        Value::Polygon(rings) => {
            let polygon = convert_polygon(rings, input.polygons.len())?;
            input.polygons.push(polygon);
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                let polygon = convert_polygon(rings, input.polygons.len())?;
                input.polygons.push(polygon);
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_geometry(&geometry.value, input)?;
            }
        }
        Value::Point(_)
        | Value::MultiPoint(_)
        | Value::LineString(_)
        | Value::MultiLineString(_) => {
            input.ignored_geometries += 1;
        }
    }
    Ok(())
}

fn convert_polygon(rings: &[Vec<Vec<f64>>], polygon: usize) -> InputResult<GeoPolygon> {
    let mut out = Vec::with_capacity(rings.len());
    for (ring_index, ring) in rings.iter().enumerate() {
        let mut points = Vec::with_capacity(ring.len());
        for (position, coords) in ring.iter().enumerate() {
            let point = match coords.as_slice() {
                [lon, lat, ..] if lon.is_finite() && lat.is_finite() => LonLat::new(*lon, *lat),
                _ => {
                    return Err(InputError::InvalidPosition {
                        polygon,
                        ring: ring_index,
                        position,
                    });
                }
            };
            points.push(point);
        }

        // Sluitende positie wordt niet opgeslagen.
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        out.push(points);
    }
    Ok(GeoPolygon::new(out))
}
