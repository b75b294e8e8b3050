//! Scores as they arrive off the wire.
//!
//! A cabinet reports its final score as JSON, and nothing stops a buggy or
//! hostile client from sending `-1`, `3.5`, `"12"` or `null`. Decoding must
//! not fail on those, otherwise the server could only answer "bad frame"
//! instead of the specific `InvalidScore` rejection. [`ScoreInput`] accepts
//! any JSON value and defers judgement to [`ScoreInput::points`].

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::ScoreError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Raw {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    #[default]
    Malformed,
}

/// An unvalidated score value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreInput(Raw);

impl ScoreInput {
    /// A value that was not a number at all.
    pub fn malformed() -> Self {
        Self(Raw::Malformed)
    }

    /// Validates the value as a non-negative whole number of points.
    ///
    /// # Errors
    /// - [`ScoreError::NotANumber`] for strings, booleans, null, objects...
    /// - [`ScoreError::Negative`] for anything below zero
    /// - [`ScoreError::NotInteger`] for fractional numbers
    pub fn points(self) -> Result<u64, ScoreError> {
        match self.0 {
            Raw::Unsigned(n) => Ok(n),
            Raw::Signed(n) => u64::try_from(n).map_err(|_| ScoreError::Negative),
            Raw::Float(f) if f.is_nan() => Err(ScoreError::NotANumber),
            Raw::Float(f) if f < 0.0 => Err(ScoreError::Negative),
            Raw::Float(f) if f.fract() != 0.0 || f > u64::MAX as f64 => {
                Err(ScoreError::NotInteger)
            }
            Raw::Float(f) => Ok(f as u64),
            Raw::Malformed => Err(ScoreError::NotANumber),
        }
    }
}

impl From<u64> for ScoreInput {
    fn from(points: u64) -> Self {
        Self(Raw::Unsigned(points))
    }
}

impl From<i64> for ScoreInput {
    fn from(points: i64) -> Self {
        Self(Raw::Signed(points))
    }
}

impl From<f64> for ScoreInput {
    fn from(points: f64) -> Self {
        Self(Raw::Float(points))
    }
}

impl Serialize for ScoreInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Raw::Unsigned(n) => serializer.serialize_u64(n),
            Raw::Signed(n) => serializer.serialize_i64(n),
            Raw::Float(f) => serializer.serialize_f64(f),
            Raw::Malformed => serializer.serialize_none(),
        }
    }
}

struct ScoreVisitor;

impl<'de> Visitor<'de> for ScoreVisitor {
    type Value = ScoreInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ScoreInput, E> {
        Ok(ScoreInput(Raw::Unsigned(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ScoreInput, E> {
        Ok(ScoreInput(Raw::Signed(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ScoreInput, E> {
        Ok(ScoreInput(Raw::Float(v)))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<ScoreInput, E> {
        Ok(ScoreInput::malformed())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<ScoreInput, E> {
        Ok(ScoreInput::malformed())
    }

    fn visit_bytes<E: de::Error>(self, _: &[u8]) -> Result<ScoreInput, E> {
        Ok(ScoreInput::malformed())
    }

    fn visit_unit<E: de::Error>(self) -> Result<ScoreInput, E> {
        Ok(ScoreInput::malformed())
    }

    fn visit_none<E: de::Error>(self) -> Result<ScoreInput, E> {
        Ok(ScoreInput::malformed())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<ScoreInput, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ScoreInput, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(ScoreInput::malformed())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ScoreInput, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(ScoreInput::malformed())
    }
}

impl<'de> Deserialize<'de> for ScoreInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScoreVisitor)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    fn parse(json: &str) -> ScoreInput {
        serde_json::from_str(json).expect("any JSON value should decode")
    }

    #[test]
    fn test_points_accepts_whole_numbers() {
        assert_eq!(parse("12").points(), Ok(12));
        assert_eq!(parse("0").points(), Ok(0));
        assert_eq!(parse("15.0").points(), Ok(15));
    }

    #[test]
    fn test_points_rejects_negative() {
        assert_eq!(parse("-1").points(), Err(ScoreError::Negative));
        assert_eq!(parse("-0.5").points(), Err(ScoreError::Negative));
        assert_eq!(ScoreInput::from(-1_i64).points(), Err(ScoreError::Negative));
    }

    #[test]
    fn test_points_rejects_fractions() {
        assert_eq!(parse("3.5").points(), Err(ScoreError::NotInteger));
    }

    #[test]
    fn test_points_rejects_non_numbers() {
        for json in [r#""12""#, "true", "null", "[1]", r#"{"score": 1}"#] {
            assert_eq!(parse(json).points(), Err(ScoreError::NotANumber), "{json}");
        }
    }

    #[test]
    fn test_missing_field_defaults_to_malformed() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default)]
            score: ScoreInput,
        }
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.score.points(), Err(ScoreError::NotANumber));
    }

    #[test]
    fn test_serialize_keeps_integer_shape() {
        assert_eq!(serde_json::to_string(&ScoreInput::from(7_u64)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&ScoreInput::from(-1_i64)).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&ScoreInput::malformed()).unwrap(), "null");
    }
}
