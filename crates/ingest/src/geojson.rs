//! GeoJSON Point Extraction

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::IngestError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// A point feature ready to be written to `geojson_data`
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    /// Position of the feature in the collection
    pub feature_index: usize,
    pub longitude: f64,
    pub latitude: f64,
    /// Feature properties serialized as JSON text
    pub properties: String,
}

/// Points extracted from a feature collection
#[derive(Debug, Clone, Default)]
pub struct ParsedFeatures {
    /// Total features in the collection
    pub features: usize,
    pub points: Vec<GeoPoint>,
    /// Features without a usable point geometry
    pub skipped: usize,
}

/// Parse a GeoJSON `FeatureCollection`, keeping only `Point` features.
///
/// GeoJSON positions are `[longitude, latitude, ...]`.
pub fn parse_feature_collection(text: &str) -> Result<ParsedFeatures, IngestError> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    if collection.kind != "FeatureCollection" {
        return Err(IngestError::InvalidGeoJson(format!(
            "expected a FeatureCollection, found {}",
            collection.kind
        )));
    }

    let mut parsed = ParsedFeatures {
        features: collection.features.len(),
        ..Default::default()
    };

    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!(feature = index, "skipping feature without geometry");
            parsed.skipped += 1;
            continue;
        };

        if geometry.kind != "Point" {
            warn!(feature = index, kind = %geometry.kind, "skipping non-point geometry");
            parsed.skipped += 1;
            continue;
        }

        let Some((longitude, latitude)) = position(&geometry.coordinates) else {
            warn!(feature = index, "skipping point with malformed coordinates");
            parsed.skipped += 1;
            continue;
        };

        let properties = Value::Object(feature.properties.unwrap_or_default()).to_string();
        parsed.points.push(GeoPoint {
            feature_index: index,
            longitude,
            latitude,
            properties,
        });
    }

    Ok(parsed)
}

fn position(coordinates: &Value) -> Option<(f64, f64)> {
    match coordinates.as_array()?.as_slice() {
        [lon, lat, ..] => Some((lon.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}
