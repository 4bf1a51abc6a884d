//! The academic time structure: term structures own ordered terms, terms own
//! ordered assessment periods.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::lookup::effective_weight;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TermStructureStatus {
  #[default]
  Active,
  Inactive,
}

/// A grading window within a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPeriod {
  pub period_id: Uuid,
  pub term_id:   Uuid,
  pub name:      String,
  pub order:     i64,
  /// Relative share of the term grade. Not required to sum to any particular
  /// total across a term.
  pub weight:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicTerm {
  pub term_id:           Uuid,
  pub term_structure_id: Uuid,
  pub name:              String,
  pub order:             i64,
  /// Sorted by `order`.
  pub periods:           Vec<AssessmentPeriod>,
}

impl AcademicTerm {
  /// Sum of the weights that actually count; negative weights count as 0.
  pub fn total_period_weight(&self) -> f64 {
    self.periods.iter().map(|p| effective_weight(p.weight)).sum()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStructure {
  pub term_structure_id: Uuid,
  pub program_id:        Uuid,
  pub name:              String,
  pub order:             i64,
  pub status:            TermStructureStatus,
  /// Sorted by `order`.
  pub terms:             Vec<AcademicTerm>,
}
