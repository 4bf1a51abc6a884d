//! Assessment systems and per-subject assessment configuration.
//!
//! An assessment system belongs to a program and defines how percentages are
//! translated into grade points. A subject's [`SubjectAssessmentConfig`]
//! defines how individual activity types are weighted and where the passing
//! line sits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::Error;

/// Default passing line when a subject's config leaves it unset.
pub const DEFAULT_MIN_PERCENTAGE: f64 = 50.0;

// ─── Assessment system ───────────────────────────────────────────────────────

/// The grading model a program uses. Stored and serialised in
/// `SCREAMING_SNAKE_CASE`, e.g. `"MARKING_SCHEME"`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentSystemKind {
  MarkingScheme,
  Rubric,
  Cgpa,
  Hybrid,
}

impl AssessmentSystemKind {
  /// Render a grade the way the system presents it: grade points to two
  /// decimals for CGPA, a one-decimal percentage otherwise.
  pub fn display_grade(self, value: f64) -> String {
    match self {
      Self::Cgpa => format!("{value:.2}"),
      Self::MarkingScheme | Self::Rubric | Self::Hybrid => {
        format!("{value:.1}%")
      }
    }
  }
}

/// One row of a percentage → grade-point table: any percentage at or above
/// `min_percentage` (and below the next band) earns `grade_points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaBand {
  pub min_percentage: f64,
  pub grade_points:   f64,
}

/// A validated GPA mapping. Bands are kept sorted by `min_percentage` and
/// grade points never decrease as the threshold rises, which makes the
/// mapping monotonic by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GpaBand>", into = "Vec<GpaBand>")]
pub struct GpaScale {
  bands: Vec<GpaBand>,
}

impl GpaScale {
  pub fn new(mut bands: Vec<GpaBand>) -> Result<Self, Error> {
    for band in &bands {
      if !band.min_percentage.is_finite() || !band.grade_points.is_finite() {
        return Err(Error::InvalidGpaScale(
          "band values must be finite numbers".into(),
        ));
      }
      if !(0.0..=100.0).contains(&band.min_percentage) {
        return Err(Error::InvalidGpaScale(format!(
          "band threshold {} is outside 0..=100",
          band.min_percentage
        )));
      }
    }

    bands.sort_by(|a, b| a.min_percentage.total_cmp(&b.min_percentage));

    for pair in bands.windows(2) {
      if pair[0].min_percentage == pair[1].min_percentage {
        return Err(Error::InvalidGpaScale(format!(
          "duplicate band threshold {}",
          pair[0].min_percentage
        )));
      }
      if pair[1].grade_points < pair[0].grade_points {
        return Err(Error::InvalidGpaScale(format!(
          "grade points drop from {} to {} at {}%",
          pair[0].grade_points, pair[1].grade_points, pair[1].min_percentage
        )));
      }
    }

    Ok(Self { bands })
  }

  pub fn bands(&self) -> &[GpaBand] { &self.bands }

  /// Grade points for a percentage. Out-of-range input is clamped to
  /// `0..=100`; NaN counts as 0. Below the lowest band the result is 0.
  pub fn grade_points(&self, percentage: f64) -> f64 {
    let p = if percentage.is_nan() {
      0.0
    } else {
      percentage.clamp(0.0, 100.0)
    };
    self
      .bands
      .iter()
      .rev()
      .find(|band| band.min_percentage <= p)
      .map_or(0.0, |band| band.grade_points)
  }
}

impl Default for GpaScale {
  /// The conventional 4-point scale.
  fn default() -> Self {
    let bands = [(0.0, 0.0), (60.0, 1.0), (70.0, 2.0), (80.0, 3.0), (90.0, 4.0)]
      .into_iter()
      .map(|(min_percentage, grade_points)| GpaBand { min_percentage, grade_points })
      .collect();
    Self { bands }
  }
}

impl TryFrom<Vec<GpaBand>> for GpaScale {
  type Error = Error;

  fn try_from(bands: Vec<GpaBand>) -> Result<Self, Self::Error> { Self::new(bands) }
}

impl From<GpaScale> for Vec<GpaBand> {
  fn from(scale: GpaScale) -> Self { scale.bands }
}

/// A program's grading model. Gradebooks reference one by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSystem {
  pub assessment_system_id: Uuid,
  pub program_id:           Uuid,
  pub name:                 String,
  pub kind:                 AssessmentSystemKind,
  #[serde(default)]
  pub gpa_scale:            GpaScale,
}

// ─── Subject configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassingCriteria {
  /// Falls back to [`DEFAULT_MIN_PERCENTAGE`] when unset.
  pub min_percentage: Option<f64>,
}

/// Per-subject weighting and passing rules. Persisted as a camelCase JSON
/// document (`weightageDistribution`, `passingCriteria.minPercentage`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAssessmentConfig {
  /// Assessment-type name → relative weight. Keys are matched
  /// case-insensitively by [`crate::lookup::weight_of`].
  #[serde(default)]
  pub weightage_distribution: HashMap<String, f64>,
  #[serde(default)]
  pub passing_criteria:       PassingCriteria,
}

impl SubjectAssessmentConfig {
  pub fn min_percentage(&self) -> f64 {
    self
      .passing_criteria
      .min_percentage
      .unwrap_or(DEFAULT_MIN_PERCENTAGE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_round_trips_through_strum_and_serde() {
    assert_eq!(AssessmentSystemKind::MarkingScheme.as_ref(), "MARKING_SCHEME");
    assert_eq!(
      "CGPA".parse::<AssessmentSystemKind>().unwrap(),
      AssessmentSystemKind::Cgpa
    );
    let json = serde_json::to_string(&AssessmentSystemKind::Hybrid).unwrap();
    assert_eq!(json, "\"HYBRID\"");
  }

  #[test]
  fn display_grade_depends_on_kind() {
    assert_eq!(AssessmentSystemKind::Cgpa.display_grade(3.456), "3.46");
    assert_eq!(AssessmentSystemKind::MarkingScheme.display_grade(68.0), "68.0%");
  }

  #[test]
  fn scale_rejects_decreasing_points() {
    let err = GpaScale::new(vec![
      GpaBand { min_percentage: 0.0, grade_points: 0.0 },
      GpaBand { min_percentage: 50.0, grade_points: 3.0 },
      GpaBand { min_percentage: 80.0, grade_points: 2.0 },
    ])
    .unwrap_err();
    assert!(matches!(err, Error::InvalidGpaScale(_)));
  }

  #[test]
  fn scale_rejects_out_of_range_threshold() {
    let err = GpaScale::new(vec![GpaBand {
      min_percentage: 120.0,
      grade_points:   4.0,
    }])
    .unwrap_err();
    assert!(matches!(err, Error::InvalidGpaScale(_)));
  }

  #[test]
  fn scale_sorts_unordered_bands() {
    let scale = GpaScale::new(vec![
      GpaBand { min_percentage: 75.0, grade_points: 3.0 },
      GpaBand { min_percentage: 0.0, grade_points: 0.0 },
      GpaBand { min_percentage: 50.0, grade_points: 2.0 },
    ])
    .unwrap();
    assert_eq!(scale.grade_points(60.0), 2.0);
    assert_eq!(scale.grade_points(75.0), 3.0);
    assert_eq!(scale.grade_points(49.9), 0.0);
  }

  #[test]
  fn scale_deserialises_from_plain_band_list() {
    let json = r#"[{"minPercentage":0,"gradePoints":0},{"minPercentage":90,"gradePoints":4}]"#;
    let scale: GpaScale = serde_json::from_str(json).unwrap();
    assert_eq!(scale.bands().len(), 2);

    let bad = r#"[{"minPercentage":0,"gradePoints":4},{"minPercentage":90,"gradePoints":1}]"#;
    assert!(serde_json::from_str::<GpaScale>(bad).is_err());
  }

  #[test]
  fn config_defaults_min_percentage_to_fifty() {
    let config: SubjectAssessmentConfig =
      serde_json::from_str(r#"{"weightageDistribution":{"quiz":1}}"#).unwrap();
    assert_eq!(config.min_percentage(), 50.0);
  }
}
