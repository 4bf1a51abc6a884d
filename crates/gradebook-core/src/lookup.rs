//! Assessment lookup: the leaf rules every aggregation level consults.

use std::collections::HashMap;

use crate::assessment::{AssessmentSystem, SubjectAssessmentConfig};

/// Weight used for assessment types the subject's distribution does not list.
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// Normalise an assessment-type name into a lookup key: trimmed, lowercase,
/// with spaces and hyphens folded to underscores.
pub fn normalize_type_key(assessment_type: &str) -> String {
  assessment_type
    .trim()
    .chars()
    .map(|c| match c {
      ' ' | '-' => '_',
      other => other.to_ascii_lowercase(),
    })
    .collect()
}

/// A configured weight as it enters an aggregate: negative or non-finite
/// weights count as 0.
pub fn effective_weight(weight: f64) -> f64 {
  if weight.is_finite() && weight >= 0.0 { weight } else { 0.0 }
}

/// Weight of an assessment type within a subject's weightage distribution.
///
/// Matching is case-insensitive on normalised keys. Absent types get
/// [`NEUTRAL_WEIGHT`]. An explicit weight that is negative or not finite
/// contributes nothing (0).
///
/// When several keys normalise to the same type, a key already in normal
/// form wins, then the lexicographically smallest key.
pub fn weight_of(
  assessment_type: &str,
  weightage_distribution: &HashMap<String, f64>,
) -> f64 {
  let key = normalize_type_key(assessment_type);
  weightage_distribution
    .iter()
    .filter(|(name, _)| normalize_type_key(name) == key)
    .min_by_key(|(name, _)| (name.as_str() != key, name.as_str()))
    .map_or(NEUTRAL_WEIGHT, |(_, &weight)| effective_weight(weight))
}

/// Grade points for a percentage under an assessment system's GPA mapping.
pub fn gpa_for(percentage: f64, system: &AssessmentSystem) -> f64 {
  system.gpa_scale.grade_points(percentage)
}

pub fn is_passing(percentage: f64, config: &SubjectAssessmentConfig) -> bool {
  percentage >= config.min_percentage()
}
