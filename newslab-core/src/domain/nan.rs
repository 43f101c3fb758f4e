//! Serde adapter for `f64` fields that may be undefined.
//!
//! NaN is written as `null` and `null` reads back as NaN, so undefined
//! statistics survive a JSON round trip.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        value: f64,
    }

    #[test]
    fn nan_round_trips_through_null() {
        let json = serde_json::to_string(&Holder { value: f64::NAN }).unwrap();
        assert_eq!(json, r#"{"value":null}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_nan());
    }

    #[test]
    fn finite_value_is_preserved() {
        let back: Holder = serde_json::from_str(r#"{"value":0.25}"#).unwrap();
        assert_eq!(back.value, 0.25);
    }
}
