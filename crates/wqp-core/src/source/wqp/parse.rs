//! Decode the station-summary GeoJSON feature collection into inventory rows.

use serde::{Deserialize, Deserializer};

use crate::inventory::InventoryRecord;
use crate::source::SourceError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Properties {
    organization_identifier: String,
    monitoring_location_identifier: String,
    #[serde(default)]
    resolved_monitoring_location_type_name: Option<String>,
    #[serde(default)]
    state_name: Option<String>,
    #[serde(default)]
    county_name: Option<String>,
    #[serde(default, rename = "HUCEightDigitCode")]
    huc_eight_digit_code: Option<String>,
    #[serde(default, rename = "resultCount", deserialize_with = "count_lenient")]
    result_count: u64,
}

/// The service reports counts either as JSON numbers or numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum CountValue {
    Number(u64),
    Text(String),
}

fn count_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CountValue>::deserialize(deserializer)? {
        None => Ok(0),
        Some(CountValue::Number(n)) => Ok(n),
        Some(CountValue::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse::<u64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid result count: {:?}", s)))
        }
    }
}

/// Parse a response body into inventory rows, one per feature, in response order.
pub(super) fn parse_feature_collection(body: &[u8]) -> Result<Vec<InventoryRecord>, SourceError> {
    let collection: FeatureCollection = serde_json::from_slice(body)?;
    Ok(collection.features.into_iter().map(into_record).collect())
}

fn into_record(feature: Feature) -> InventoryRecord {
    let (longitude, latitude) = match feature.geometry.as_ref().map(|g| g.coordinates.as_slice()) {
        Some([lon, lat, ..]) => (Some(*lon), Some(*lat)),
        _ => (None, None),
    };
    let p = feature.properties;
    InventoryRecord {
        org_id: p.organization_identifier,
        site_id: p.monitoring_location_identifier,
        site_type: p.resolved_monitoring_location_type_name.unwrap_or_default(),
        region_name: p.state_name.unwrap_or_default(),
        sub_region_name: p.county_name.unwrap_or_default(),
        huc: p.huc_eight_digit_code.unwrap_or_default(),
        latitude,
        longitude,
        result_count: p.result_count,
    }
}
