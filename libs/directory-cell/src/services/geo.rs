use serde_json::Value;
use tracing::debug;

use crate::models::GeoPoint;

/// Converts any known location shape into a `GeoPoint`.
///
/// Documents written by different clients store coordinates as map-picker
/// `{lat, lng}` objects, store-native geo points (`{latitude, longitude}`
/// or the serialised `{_lat, _long}`), `[lat, lng]` pairs, or a legacy
/// `"lat, lng"` string. Anything else yields `None`.
pub fn normalize_location(raw: &Value) -> Option<GeoPoint> {
    let point = match raw {
        Value::Object(map) => {
            let pick = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).and_then(number));
            let lat = pick(&["latitude", "lat", "_lat", "_latitude"]);
            let lng = pick(&["longitude", "lng", "lon", "long", "_long", "_longitude"]);
            match (lat, lng) {
                (Some(lat), Some(lng)) => GeoPoint::new(lat, lng),
                _ => None,
            }
        }
        Value::Array(items) if items.len() == 2 => {
            match (number(&items[0]), number(&items[1])) {
                (Some(lat), Some(lng)) => GeoPoint::new(lat, lng),
                _ => None,
            }
        }
        Value::String(text) => parse_pair(text),
        Value::Null => return None,
        _ => None,
    };

    if point.is_none() {
        debug!("Ignoring unrecognised location value: {}", raw);
    }
    point
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_pair(text: &str) -> Option<GeoPoint> {
    let mut parts = text.split(',').map(str::trim);
    let lat = parts.next()?.parse().ok()?;
    let lng = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    GeoPoint::new(lat, lng)
}
