//! Pure grade aggregation: submissions → period grade → term grade →
//! cumulative grade.
//!
//! Every level uses the same degenerate-weight policy: when nothing with a
//! positive weight contributed, the result is exactly 0, never NaN. Callers
//! that need to tell "graded as zero" from "not graded yet" must look at the
//! inputs, not the percentage.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
  assessment::{AssessmentSystem, SubjectAssessmentConfig},
  catalog::{GradedWork, Subject},
  grade::{AssessmentPeriodGrade, CumulativeGrade, SubjectTermGrade},
  lookup::{effective_weight, gpa_for, is_passing, weight_of},
  term::AssessmentPeriod,
};

// ─── Weighted mean ───────────────────────────────────────────────────────────

/// Running Σ(value × weight) and Σweight.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
  weighted_sum: f64,
  total_weight: f64,
}

impl WeightedMean {
  pub fn add(&mut self, value: f64, weight: f64) {
    self.weighted_sum += value * weight;
    self.total_weight += weight;
  }

  pub fn weighted_sum(&self) -> f64 { self.weighted_sum }

  pub fn total_weight(&self) -> f64 { self.total_weight }

  /// `weighted_sum / total_weight`, or 0 when no positive weight accumulated.
  pub fn mean(&self) -> f64 {
    if self.total_weight > 0.0 {
      self.weighted_sum / self.total_weight
    } else {
      0.0
    }
  }
}

/// `obtained / total × 100`; a non-positive or non-finite total scores 0.
pub fn submission_percentage(obtained_marks: f64, total_marks: f64) -> f64 {
  if total_marks > 0.0 && total_marks.is_finite() && obtained_marks.is_finite() {
    obtained_marks / total_marks * 100.0
  } else {
    0.0
  }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// Aggregate one student's graded work in one subject and period.
///
/// Each submission contributes its percentage weighted by its activity's
/// assessment type. `obtained_marks` / `total_marks` on the result are the
/// raw weighted sums (Σ pct×w and Σw×100).
pub fn period_grade<'a>(
  period: &AssessmentPeriod,
  work: impl IntoIterator<Item = &'a GradedWork>,
  config: &SubjectAssessmentConfig,
  system: &AssessmentSystem,
) -> AssessmentPeriodGrade {
  let mut mean = WeightedMean::default();
  for item in work {
    let weight = weight_of(
      &item.activity.assessment_type,
      &config.weightage_distribution,
    );
    let percentage = submission_percentage(item.obtained_marks(), item.total_marks());
    mean.add(percentage, weight);
  }

  let percentage = mean.mean();
  AssessmentPeriodGrade {
    period_id: period.period_id,
    obtained_marks: mean.weighted_sum(),
    total_marks: mean.total_weight() * 100.0,
    percentage,
    weight: period.weight,
    is_passing: is_passing(percentage, config),
    grade_points: gpa_for(percentage, system),
  }
}

// ─── Term ────────────────────────────────────────────────────────────────────

/// Combine period grades into a subject's term grade, weighting each period
/// by its configured share. A negative period weight counts as 0.
pub fn term_grade(
  term_id: Uuid,
  student_id: Uuid,
  period_grades: impl IntoIterator<Item = AssessmentPeriodGrade>,
  subject: &Subject,
  config: &SubjectAssessmentConfig,
  system: &AssessmentSystem,
) -> SubjectTermGrade {
  let mut mean = WeightedMean::default();
  let mut total_marks = 0.0;
  let mut grades = BTreeMap::new();

  for grade in period_grades {
    mean.add(grade.percentage, effective_weight(grade.weight));
    total_marks += grade.total_marks;
    grades.insert(grade.period_id, grade);
  }

  let percentage = mean.mean();
  SubjectTermGrade {
    term_id,
    student_id,
    period_grades: grades,
    final_grade: percentage,
    total_marks,
    percentage,
    is_passing: is_passing(percentage, config),
    grade_points: gpa_for(percentage, system),
    credits: subject.credit_load(),
  }
}

// ─── Cumulative ──────────────────────────────────────────────────────────────

/// Credit-weighted GPA over a student's subject term grades. Subjects whose
/// credits are not positive are listed as uncredited and left out of every
/// credit total.
pub fn cumulative_grade(
  student_id: Uuid,
  term_id: Uuid,
  subject_grades: BTreeMap<Uuid, SubjectTermGrade>,
) -> CumulativeGrade {
  let mut gpa = WeightedMean::default();
  let mut earned_credits = 0.0;
  let mut uncredited_subjects = Vec::new();

  for (subject_id, grade) in &subject_grades {
    let credits = effective_weight(grade.credits);
    if credits <= 0.0 {
      uncredited_subjects.push(*subject_id);
      continue;
    }
    gpa.add(grade.grade_points, credits);
    if grade.is_passing {
      earned_credits += credits;
    }
  }

  CumulativeGrade {
    student_id,
    term_id,
    gpa: gpa.mean(),
    total_credits: gpa.total_weight(),
    earned_credits,
    subject_grades,
    uncredited_subjects,
  }
}
