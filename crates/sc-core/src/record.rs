use crate::error::{ErrorCode, ScError, ScResult};
use crate::ids::ZoneId;
use crate::zone::{
    GeofenceZone, ZoneKind, ZoneStyle, DEFAULT_FILL_COLOR, DEFAULT_STROKE_COLOR,
    DEFAULT_STROKE_WIDTH_PX,
};
use sc_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Persisted shape of a zone. Field names are the contract with the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    pub id: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_meters: f64,
    #[serde(default)]
    pub is_disaster: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_fill_color")]
    pub fill_color: u32,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: u32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width_px: f32,
}

fn default_fill_color() -> u32 {
    DEFAULT_FILL_COLOR
}

fn default_stroke_color() -> u32 {
    DEFAULT_STROKE_COLOR
}

fn default_stroke_width() -> f32 {
    DEFAULT_STROKE_WIDTH_PX
}

impl ZoneRecord {
    /// Lenient parse of a record as it comes back from the store.
    ///
    /// Numbers may be stored as integers or floats, colors as signed or
    /// unsigned 32-bit ARGB. Only the geometry fields are mandatory. A
    /// missing or null id is replaced with a fresh token; a string id is
    /// kept verbatim, even when empty.
    pub fn parse(value: &Value) -> ScResult<Self> {
        let Some(fields) = value.as_object() else {
            return Err(ScError::new(
                ErrorCode::MalformedZoneRecord,
                "zone record is not an object",
            ));
        };

        let center_lat = required_number(fields, "centerLat")?;
        let center_lng = required_number(fields, "centerLng")?;
        let radius_meters = required_number(fields, "radiusMeters")?;

        let id = match fields.get("id") {
            None | Some(Value::Null) => ZoneId::generate().to_string(),
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(ScError::new(
                    ErrorCode::MalformedZoneRecord,
                    format!("field `id` is not a string: {}", other),
                ));
            }
        };

        Ok(Self {
            id,
            center_lat,
            center_lng,
            radius_meters,
            is_disaster: fields
                .get("isDisaster")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            label: fields
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            fill_color: fields
                .get("fillColor")
                .and_then(color_value)
                .unwrap_or(DEFAULT_FILL_COLOR),
            stroke_color: fields
                .get("strokeColor")
                .and_then(color_value)
                .unwrap_or(DEFAULT_STROKE_COLOR),
            stroke_width_px: fields
                .get("strokeWidthPx")
                .and_then(Value::as_f64)
                .map(|width| width as f32)
                .unwrap_or(DEFAULT_STROKE_WIDTH_PX),
        })
    }

    pub fn to_value(&self) -> Value {
        json!({
            "id": self.id,
            "centerLat": self.center_lat,
            "centerLng": self.center_lng,
            "radiusMeters": self.radius_meters,
            "isDisaster": self.is_disaster,
            "label": self.label,
            "fillColor": self.fill_color,
            "strokeColor": self.stroke_color,
            "strokeWidthPx": self.stroke_width_px,
        })
    }
}

fn required_number(fields: &Map<String, Value>, key: &str) -> ScResult<f64> {
    match fields.get(key) {
        Some(value) => value.as_f64().ok_or_else(|| {
            ScError::new(
                ErrorCode::MalformedZoneRecord,
                format!("field `{}` is not numeric: {}", key, value),
            )
        }),
        None => Err(ScError::new(
            ErrorCode::MalformedZoneRecord,
            format!("missing field `{}`", key),
        )),
    }
}

fn color_value(value: &Value) -> Option<u32> {
    let raw = match value.as_i64() {
        Some(raw) => raw,
        None => {
            let float = value.as_f64()?;
            if float.fract() != 0.0 {
                return None;
            }
            float as i64
        }
    };
    match i32::try_from(raw) {
        Ok(signed) => Some(signed as u32),
        Err(_) => u32::try_from(raw).ok(),
    }
}

impl GeofenceZone {
    pub fn to_record(&self) -> ZoneRecord {
        let style = self.style();
        ZoneRecord {
            id: self.id().to_string(),
            center_lat: self.center().latitude(),
            center_lng: self.center().longitude(),
            radius_meters: self.radius_m(),
            is_disaster: self.kind().is_disaster(),
            label: self.label().to_string(),
            fill_color: style.fill_color,
            stroke_color: style.stroke_color,
            stroke_width_px: style.stroke_width_px,
        }
    }

    pub fn from_record(record: &ZoneRecord) -> ScResult<Self> {
        let center = GeoPoint::new(record.center_lat, record.center_lng).map_err(|err| {
            ScError::new(
                ErrorCode::InvalidZone,
                format!("zone {}: {}", record.id, err),
            )
        })?;
        let zone = GeofenceZone::new(
            ZoneId::new(record.id.clone()),
            center,
            record.radius_meters,
            ZoneKind::from_is_disaster(record.is_disaster),
        )?;
        Ok(zone.with_label(record.label.clone()).with_style(ZoneStyle {
            fill_color: record.fill_color,
            stroke_color: record.stroke_color,
            stroke_width_px: record.stroke_width_px,
        }))
    }

    pub fn parse(value: &Value) -> ScResult<Self> {
        Self::from_record(&ZoneRecord::parse(value)?)
    }
}

/// Result of parsing a snapshot: the zones that loaded and why the others
/// did not.
#[derive(Debug, Clone, Default)]
pub struct ZoneBatch {
    pub zones: Vec<GeofenceZone>,
    pub rejected: Vec<ScError>,
}

pub fn parse_zone_batch(records: &[Value]) -> ZoneBatch {
    let mut batch = ZoneBatch::default();
    for record in records {
        match GeofenceZone::parse(record) {
            Ok(zone) => batch.zones.push(zone),
            Err(err) => batch.rejected.push(err),
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, kind: ZoneKind) -> GeofenceZone {
        GeofenceZone::new(
            id.into(),
            GeoPoint::new(14.5646, 120.9930).unwrap(),
            512.25,
            kind,
        )
        .unwrap()
        .with_label("Home")
    }

    #[test]
    fn record_round_trip_is_lossless() {
        let placed = zone("1700000000000", ZoneKind::Hazard).with_style(ZoneStyle {
            fill_color: 0x1234_5678,
            stroke_color: 0xFFFF_FFFF,
            stroke_width_px: 2.5,
        });
        let restored = GeofenceZone::from_record(&placed.to_record()).unwrap();
        assert_eq!(restored, placed);

        let through_json = GeofenceZone::parse(&placed.to_record().to_value()).unwrap();
        assert_eq!(through_json, placed);
    }

    #[test]
    fn serde_uses_wire_field_names() {
        let value = serde_json::to_value(zone("a", ZoneKind::Watch).to_record()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "id",
            "centerLat",
            "centerLng",
            "radiusMeters",
            "isDisaster",
            "label",
            "fillColor",
            "strokeColor",
            "strokeWidthPx",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(value, zone("a", ZoneKind::Watch).to_record().to_value());
    }

    #[test]
    fn parse_accepts_integer_numbers_and_defaults() {
        let record = ZoneRecord::parse(&json!({
            "id": "abc",
            "centerLat": 14,
            "centerLng": 121,
            "radiusMeters": 500,
        }))
        .unwrap();
        assert_eq!(record.center_lat, 14.0);
        assert_eq!(record.center_lng, 121.0);
        assert_eq!(record.radius_meters, 500.0);
        assert!(!record.is_disaster);
        assert_eq!(record.label, "");
        assert_eq!(record.fill_color, DEFAULT_FILL_COLOR);
        assert_eq!(record.stroke_color, DEFAULT_STROKE_COLOR);
        assert_eq!(record.stroke_width_px, DEFAULT_STROKE_WIDTH_PX);
    }

    #[test]
    fn parse_accepts_signed_argb_colors() {
        let record = ZoneRecord::parse(&json!({
            "centerLat": 1.0,
            "centerLng": 2.0,
            "radiusMeters": 3.0,
            "fillColor": -13_000_193,
            "strokeColor": 4_281_967_103u64,
            "strokeWidthPx": 6,
        }))
        .unwrap();
        assert_eq!(record.fill_color, 0xFF39_A1FF);
        assert_eq!(record.stroke_color, 0xFF39_A1FF);
        assert_eq!(record.stroke_width_px, 6.0);
    }

    #[test]
    fn missing_id_gets_generated_token() {
        let record = ZoneRecord::parse(&json!({
            "centerLat": 1.0,
            "centerLng": 2.0,
            "radiusMeters": 3.0,
        }))
        .unwrap();
        assert!(record.id.parse::<u64>().is_ok());
    }

    #[test]
    fn empty_id_is_kept_and_non_string_id_rejected() {
        let empty = ZoneRecord::parse(&json!({
            "id": "",
            "centerLat": 1.0,
            "centerLng": 2.0,
            "radiusMeters": 3.0,
        }))
        .unwrap();
        assert_eq!(empty.id, "");

        let null = ZoneRecord::parse(&json!({
            "id": null,
            "centerLat": 1.0,
            "centerLng": 2.0,
            "radiusMeters": 3.0,
        }))
        .unwrap();
        assert!(null.id.parse::<u64>().is_ok());

        let numeric = ZoneRecord::parse(&json!({
            "id": 7,
            "centerLat": 1.0,
            "centerLng": 2.0,
            "radiusMeters": 3.0,
        }))
        .unwrap_err();
        assert!(numeric.is(ErrorCode::MalformedZoneRecord));
    }

    #[test]
    fn deserialize_fills_style_defaults() {
        let record: ZoneRecord = serde_json::from_value(json!({
            "id": "w1",
            "centerLat": 14.5646,
            "centerLng": 120.993,
            "radiusMeters": 500.0,
        }))
        .unwrap();
        assert!(!record.is_disaster);
        assert_eq!(record.label, "");
        assert_eq!(record.fill_color, DEFAULT_FILL_COLOR);
        assert_eq!(record.stroke_color, DEFAULT_STROKE_COLOR);
        assert_eq!(record.stroke_width_px, DEFAULT_STROKE_WIDTH_PX);

        let zone = GeofenceZone::from_record(&record).unwrap();
        assert_eq!(zone.style(), ZoneStyle::default());
    }

    #[test]
    fn missing_or_non_numeric_geometry_is_malformed() {
        let missing = ZoneRecord::parse(&json!({"id": "x", "centerLat": 1.0, "centerLng": 2.0}))
            .unwrap_err();
        assert!(missing.is(ErrorCode::MalformedZoneRecord));
        assert!(missing.message.contains("radiusMeters"));

        let text = ZoneRecord::parse(&json!({
            "centerLat": "14.5",
            "centerLng": 2.0,
            "radiusMeters": 3.0,
        }))
        .unwrap_err();
        assert!(text.is(ErrorCode::MalformedZoneRecord));

        let not_object = ZoneRecord::parse(&json!([1, 2, 3])).unwrap_err();
        assert!(not_object.is(ErrorCode::MalformedZoneRecord));
    }

    #[test]
    fn invalid_geometry_is_invalid_zone() {
        let negative = GeofenceZone::parse(&json!({
            "centerLat": 1.0,
            "centerLng": 2.0,
            "radiusMeters": -3.0,
        }))
        .unwrap_err();
        assert!(negative.is(ErrorCode::InvalidZone));

        let off_map = GeofenceZone::parse(&json!({
            "centerLat": 95.0,
            "centerLng": 2.0,
            "radiusMeters": 3.0,
        }))
        .unwrap_err();
        assert!(off_map.is(ErrorCode::InvalidZone));
    }

    #[test]
    fn batch_skips_bad_records_and_keeps_the_rest() {
        let records = vec![
            json!({"id": "a", "centerLat": 14.5646, "centerLng": 120.993, "radiusMeters": 500}),
            json!({"id": "b", "centerLat": 14.57, "centerLng": 120.993}),
            json!({"id": "c", "centerLat": 14.57, "centerLng": 120.993, "radiusMeters": 100, "isDisaster": true}),
        ];
        let batch = parse_zone_batch(&records);
        let ids: Vec<&str> = batch.zones.iter().map(|zone| zone.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(batch.rejected.len(), 1);
        assert!(batch.rejected[0].is(ErrorCode::MalformedZoneRecord));
        assert!(batch.zones[1].is_hazard());
    }
}
