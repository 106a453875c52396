use serde::{Deserialize, Deserializer, Serialize};

use crate::ArtifactError;

/// Numeric summary produced by a finished processing run.
///
/// All distances are in centimetres. Fields missing from the results file, or
/// set to `null`, default to `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsRecord {
    #[serde(rename = "autoAvgMax", default, deserialize_with = "zero_if_null")]
    pub auto_avg_max: f64,
    #[serde(rename = "autoAvgRMSE", default, deserialize_with = "zero_if_null")]
    pub auto_avg_rmse: f64,
    #[serde(rename = "goldAvgMax", default, deserialize_with = "zero_if_null")]
    pub gold_avg_max: f64,
    #[serde(rename = "goldAvgRMSE", default, deserialize_with = "zero_if_null")]
    pub gold_avg_rmse: f64,
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResultsRecord {
    /// Parse the raw text of a results file.
    ///
    /// Unknown keys are ignored. Anything that is not a JSON object, or an
    /// object whose known keys are not numbers, is a parse error.
    pub fn parse(text: &str) -> Result<Self, ArtifactError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ArtifactError::Parse("results must be a JSON object".into()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArtifactErrorKind;

    #[test]
    fn parses_all_four_fields() {
        let record =
            ResultsRecord::parse(r#"{"autoAvgMax": 3.456, "autoAvgRMSE": 1.0, "goldAvgMax": 2.0, "goldAvgRMSE": 0.5}"#).unwrap();
        assert_eq!(record.auto_avg_max, 3.456);
        assert_eq!(record.auto_avg_rmse, 1.0);
        assert_eq!(record.gold_avg_max, 2.0);
        assert_eq!(record.gold_avg_rmse, 0.5);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let record = ResultsRecord::parse(r#"{"autoAvgMax": 4.25, "extra": "ignored"}"#).unwrap();
        assert_eq!(record.auto_avg_max, 4.25);
        assert_eq!(record.auto_avg_rmse, 0.0);
        assert_eq!(record.gold_avg_max, 0.0);
        assert_eq!(record.gold_avg_rmse, 0.0);
    }

    #[test]
    fn null_fields_read_as_zero_and_keep_the_rest() {
        let record = ResultsRecord::parse(
            r#"{"autoAvgMax": 3.0, "autoAvgRMSE": 1.0, "goldAvgMax": null, "goldAvgRMSE": 0.5}"#,
        )
        .unwrap();
        assert_eq!(record.auto_avg_max, 3.0);
        assert_eq!(record.auto_avg_rmse, 1.0);
        assert_eq!(record.gold_avg_max, 0.0);
        assert_eq!(record.gold_avg_rmse, 0.5);

        let record = ResultsRecord::parse(r#"{"autoAvgMax": 3.0, "goldAvgMax": null}"#).unwrap();
        assert_eq!(record, ResultsRecord { auto_avg_max: 3.0, ..ResultsRecord::default() });
    }

    #[test]
    fn rejects_text_that_is_not_a_record() {
        for text in ["not json", "[1, 2]", "null", r#"{"goldAvgMax": "two"}"#, ""] {
            let error = ResultsRecord::parse(text).unwrap_err();
            assert_eq!(error.kind(), ArtifactErrorKind::ParseError, "input: {text:?}");
        }
    }
}
