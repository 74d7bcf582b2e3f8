//! Geocoder response parsing functionality.
//!
//! The Yandex geocoder returns one fixed, deeply nested JSON shape. Rather
//! than deserializing the whole document into types, this module walks the
//! single extraction path and tolerates whatever else the service sends
//! back: a provider returning zero or partial matches for an address is an
//! expected outcome, not a hard error. Shape mismatches are logged and
//! recovered locally; nothing in here propagates an error to the caller.

use serde_json::Value;
use tracing::error;

use crate::error::{Error, Result};

/// One coordinate + address result extracted from a geocoder response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoRecord {
    /// Coordinate string as returned by the service ("longitude latitude"),
    /// passed through verbatim.
    pub coordinate: String,
    /// Fully resolved address as returned by the service.
    pub resolved_address: String,
}

/// Extract all geo records from one response payload.
///
/// The expected shape is a `featureMember` list under
/// `response.GeoObjectCollection`; each member carries a resolved address at
/// `GeoObject.metaDataProperty.GeocoderMetaData.text` and a coordinate at
/// `GeoObject.Point.pos`.
///
/// A payload that does not match the top-level shape yields an empty list;
/// a member missing an expected field is skipped while its siblings are
/// still processed. Both cases are logged at error level.
pub fn parse_response(payload: &Value) -> Vec<GeoRecord> {
    let members = match feature_members(payload) {
        Ok(members) => members,
        Err(e) => {
            error!(payload = %payload, "failed to parse geocoder response: {e}");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for member in members {
        match extract_record(member) {
            Ok(record) => records.push(record),
            Err(e) => {
                error!(member = %member, "failed to parse feature member: {e}");
            }
        }
    }
    records
}

fn feature_members(payload: &Value) -> Result<&Vec<Value>> {
    payload
        .get("response")
        .and_then(|v| v.get("GeoObjectCollection"))
        .and_then(|v| v.get("featureMember"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            Error::malformed_response("missing response.GeoObjectCollection.featureMember list")
        })
}

fn extract_record(member: &Value) -> Result<GeoRecord> {
    let geo_object = member
        .get("GeoObject")
        .ok_or_else(|| Error::malformed_record("missing GeoObject"))?;

    let resolved_address = geo_object
        .get("metaDataProperty")
        .and_then(|v| v.get("GeocoderMetaData"))
        .and_then(|v| v.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed_record("missing metaDataProperty.GeocoderMetaData.text"))?;

    let coordinate = geo_object
        .get("Point")
        .and_then(|v| v.get("pos"))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed_record("missing Point.pos"))?;

    Ok(GeoRecord {
        coordinate: coordinate.to_string(),
        resolved_address: resolved_address.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(pos: &str, text: &str) -> Value {
        json!({
            "GeoObject": {
                "metaDataProperty": {
                    "GeocoderMetaData": { "text": text }
                },
                "Point": { "pos": pos }
            }
        })
    }

    fn response_with(members: Vec<Value>) -> Value {
        json!({
            "response": {
                "GeoObjectCollection": { "featureMember": members }
            }
        })
    }

    #[test]
    fn test_valid_members_preserve_order() {
        let payload = response_with(vec![
            member("49.63 58.47", "first"),
            member("49.70 58.50", "second"),
            member("50.00 58.00", "third"),
        ]);

        let records = parse_response(&payload);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].coordinate, "49.63 58.47");
        assert_eq!(records[0].resolved_address, "first");
        assert_eq!(records[1].resolved_address, "second");
        assert_eq!(records[2].resolved_address, "third");
    }

    #[test]
    fn test_malformed_member_is_skipped() {
        let payload = response_with(vec![
            member("49.63 58.47", "first"),
            json!({ "GeoObject": { "Point": {} } }),
            member("50.00 58.00", "third"),
        ]);

        let records = parse_response(&payload);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].resolved_address, "first");
        assert_eq!(records[1].resolved_address, "third");
    }

    #[test]
    fn test_empty_payload_yields_no_records() {
        let records = parse_response(&json!({}));
        assert!(records.is_empty());
    }

    #[test]
    fn test_wrong_member_list_type_yields_no_records() {
        let payload = json!({
            "response": {
                "GeoObjectCollection": { "featureMember": "not a list" }
            }
        });
        assert!(parse_response(&payload).is_empty());
    }

    #[test]
    fn test_empty_member_list() {
        let records = parse_response(&response_with(vec![]));
        assert!(records.is_empty());
    }

    #[test]
    fn test_coordinate_passed_through_verbatim() {
        let payload = response_with(vec![member("  49.63   58.47 ", "addr")]);
        let records = parse_response(&payload);
        assert_eq!(records[0].coordinate, "  49.63   58.47 ");
    }
}
