//! Typed quality results.
//!
//! The engine reports quality as a nested context on each detected object.
//! [`QualityRecord::from_context`] maps the first object into a fixed set of
//! fields, and [`QualityRecord::csv_row`] renders those fields as one report
//! line.

use crate::core::constants::{OBJECTS_KEY, QUALITY_KEY};
use crate::core::errors::{ScanError, ScanResult};
use crate::pipeline::PipelineContext;
use serde::{Deserialize, Deserializer, Serialize};

/// Report columns, in output order.
pub const CSV_HEADER: [&str; 18] = [
    "Confidence",
    "totalScore",
    "isSharp",
    "sharpnessScore",
    "isEvenlyIlluminated",
    "noFlare",
    "isLeftEyeOpened",
    "isRightEyeOpened",
    "isRotationAcceptable",
    "notMasked",
    "isNeutralEmotion",
    "isEyesDistanceAcceptable",
    "eyesDistance",
    "isMarginsAcceptable",
    "isNotNoisy",
    "hasWatermark",
    "dynamicRangeScore",
    "isDynamicRangeAcceptable",
];

/// Quality sub-metrics reported for one face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_score: f64,
    pub is_sharp: bool,
    pub sharpness_score: f64,
    pub is_evenly_illuminated: bool,
    pub no_flare: bool,
    pub is_left_eye_opened: bool,
    pub is_right_eye_opened: bool,
    pub is_rotation_acceptable: bool,
    pub not_masked: bool,
    pub is_neutral_emotion: bool,
    pub is_eyes_distance_acceptable: bool,
    /// Distance between the eyes in pixels.
    #[serde(deserialize_with = "integer_from_number")]
    pub eyes_distance: i64,
    pub is_margins_acceptable: bool,
    pub is_not_noisy: bool,
    pub has_watermark: bool,
    pub dynamic_range_score: f64,
    pub is_dynamic_range_acceptable: bool,
}

/// Engines emit pixel distances as integers or floats; floats are truncated.
fn integer_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Number::deserialize(deserializer)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("{value} is not a pixel count")))
}

/// Flattened result for one processed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    /// Detection confidence of the face.
    pub confidence: f64,
    /// Quality metrics of the face.
    pub quality: QualityMetrics,
}

impl QualityRecord {
    /// Builds a record from the first detected object in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::MissingField` when there is no object, confidence
    /// or quality sub-context, and `ScanError::Json` when the quality fields
    /// do not have the expected types.
    pub fn from_context(ctx: &PipelineContext<'_>) -> ScanResult<Self> {
        let object = ctx
            .objects()
            .first()
            .ok_or_else(|| ScanError::missing_field(format!("{OBJECTS_KEY}[0]")))?;

        let confidence = object
            .get("confidence")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| ScanError::missing_field(format!("{OBJECTS_KEY}[0].confidence")))?;

        let quality = object
            .get(QUALITY_KEY)
            .ok_or_else(|| ScanError::missing_field(format!("{OBJECTS_KEY}[0].{QUALITY_KEY}")))?;
        let quality = QualityMetrics::deserialize(quality)?;

        Ok(Self {
            confidence,
            quality,
        })
    }

    /// Renders the record as the report columns, in [`CSV_HEADER`] order.
    ///
    /// Scores become integer percentages truncated toward zero, flags become
    /// `1`/`0`, the confidence is written with six significant digits.
    pub fn csv_fields(&self) -> [String; 18] {
        let q = &self.quality;
        [
            general_float(self.confidence),
            percent(q.total_score).to_string(),
            flag(q.is_sharp).to_string(),
            percent(q.sharpness_score).to_string(),
            flag(q.is_evenly_illuminated).to_string(),
            flag(q.no_flare).to_string(),
            flag(q.is_left_eye_opened).to_string(),
            flag(q.is_right_eye_opened).to_string(),
            flag(q.is_rotation_acceptable).to_string(),
            flag(q.not_masked).to_string(),
            flag(q.is_neutral_emotion).to_string(),
            flag(q.is_eyes_distance_acceptable).to_string(),
            q.eyes_distance.to_string(),
            flag(q.is_margins_acceptable).to_string(),
            flag(q.is_not_noisy).to_string(),
            flag(q.has_watermark).to_string(),
            percent(q.dynamic_range_score).to_string(),
            flag(q.is_dynamic_range_acceptable).to_string(),
        ]
    }

    /// Renders the record as one comma-separated line without terminator.
    pub fn csv_row(&self) -> String {
        self.csv_fields().join(",")
    }
}

/// Significant digits of the confidence column.
const CONFIDENCE_DIGITS: usize = 6;

/// Formats `value` like C's `%g` with [`CONFIDENCE_DIGITS`] significant digits.
///
/// Scientific notation is used when the decimal exponent is below -4 or not
/// below the digit count; trailing zeros are dropped and the exponent has at
/// least two digits (`1e-05`, `1.23457e+06`).
fn general_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let precision = CONFIDENCE_DIGITS;
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

fn percent(score: f64) -> i64 {
    (score * 100.0).trunc() as i64
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}
