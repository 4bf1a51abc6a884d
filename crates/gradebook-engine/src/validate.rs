//! Configuration validation for a class.
//!
//! The engine tolerates several incomplete configurations by producing
//! zeroes (a term with no period weight, a subject with no credits). This
//! pass surfaces those up front, alongside the gaps that make
//! initialisation or recomputation fail outright.

use std::fmt;

use gradebook_core::{
  Error, Result,
  store::GradebookStore,
  term::TermStructure,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{GradebookEngine, store_err};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationIssue {
  MissingAssessmentSystem { program_id: Uuid },
  MissingTermStructure { program_id: Uuid },
  /// The class lists a subject that does not exist.
  UnknownSubject { subject_id: Uuid },
  MissingSubjectConfig { subject_id: Uuid, name: String },
  /// Credits unset or ≤ 0: the subject is graded but cannot move GPA.
  UncreditedSubject { subject_id: Uuid, name: String },
  /// Every student's term grade will be 0.
  NonPositivePeriodWeights { term_id: Uuid, name: String, total_weight: f64 },
  /// Counted as 0 when combining periods.
  NegativePeriodWeight { period_id: Uuid, name: String, weight: f64 },
}

impl fmt::Display for ConfigurationIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingAssessmentSystem { program_id } => {
        write!(f, "program {program_id} has no assessment system")
      }
      Self::MissingTermStructure { program_id } => {
        write!(f, "program {program_id} has no active term structure")
      }
      Self::UnknownSubject { subject_id } => {
        write!(f, "subject {subject_id} does not exist")
      }
      Self::MissingSubjectConfig { subject_id, name } => {
        write!(f, "subject {name:?} ({subject_id}) has no assessment configuration")
      }
      Self::UncreditedSubject { subject_id, name } => {
        write!(f, "subject {name:?} ({subject_id}) has no credits")
      }
      Self::NonPositivePeriodWeights { term_id, name, total_weight } => write!(
        f,
        "term {name:?} ({term_id}) has a total period weight of {total_weight}"
      ),
      Self::NegativePeriodWeight { period_id, name, weight } => {
        write!(f, "period {name:?} ({period_id}) has a negative weight of {weight}")
      }
    }
  }
}

impl<S: GradebookStore> GradebookEngine<S> {
  /// List everything about a class's configuration that will either block
  /// grading or silently zero part of it. An empty list means the class is
  /// fully configured.
  pub async fn validate_class(&self, class_id: Uuid) -> Result<Vec<ConfigurationIssue>> {
    let class = self
      .store
      .get_class(class_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::ClassNotFound(class_id))?;
    let program_id = class.program_id;
    let mut issues = Vec::new();

    if self
      .store
      .program_assessment_system(program_id)
      .await
      .map_err(store_err)?
      .is_none()
    {
      issues.push(ConfigurationIssue::MissingAssessmentSystem { program_id });
    }

    // A class that already has a gradebook is bound to a structure.
    let structure = match class.term_structure_id {
      Some(id) => self.store.get_term_structure(id).await,
      None => self.store.first_active_term_structure(program_id).await,
    }
    .map_err(store_err)?;
    match structure {
      Some(structure) => issues.extend(term_weight_issues(&structure)),
      None => issues.push(ConfigurationIssue::MissingTermStructure { program_id }),
    }

    for subject_id in class.subject_ids {
      let Some(subject) = self.store.get_subject(subject_id).await.map_err(store_err)?
      else {
        issues.push(ConfigurationIssue::UnknownSubject { subject_id });
        continue;
      };
      if subject.config.is_none() {
        issues.push(ConfigurationIssue::MissingSubjectConfig {
          subject_id,
          name: subject.name.clone(),
        });
      }
      if subject.credit_load() <= 0.0 {
        issues.push(ConfigurationIssue::UncreditedSubject { subject_id, name: subject.name });
      }
    }

    info!(%class_id, issues = issues.len(), "validated class configuration");
    Ok(issues)
  }
}

fn term_weight_issues(structure: &TermStructure) -> impl Iterator<Item = ConfigurationIssue> + '_ {
  structure.terms.iter().flat_map(|term| {
    let negative = term.periods.iter().filter(|p| p.weight < 0.0).map(|p| {
      ConfigurationIssue::NegativePeriodWeight {
        period_id: p.period_id,
        name:      p.name.clone(),
        weight:    p.weight,
      }
    });
    let total_weight = term.total_period_weight();
    let total = (total_weight <= 0.0).then(|| ConfigurationIssue::NonPositivePeriodWeights {
      term_id: term.term_id,
      name: term.name.clone(),
      total_weight,
    });
    negative.chain(total)
  })
}
