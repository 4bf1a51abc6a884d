//! The gradebook computation engine.
//!
//! [`GradebookEngine`] drives the pure aggregation in
//! [`gradebook_core::calc`] against any [`GradebookStore`]: it resolves the
//! inputs each calculation needs, persists the results, and orchestrates
//! class-wide recomputation in bounded concurrent batches.

mod config;
mod cumulative;
mod grading;
mod lifecycle;
mod period;
mod term;
mod validate;

use std::sync::Arc;

use gradebook_core::store::GradebookStore;

pub use config::EngineConfig;
pub use lifecycle::{BatchReport, StudentFailure};
pub use validate::ConfigurationIssue;

/// Entry point for every grade computation.
///
/// Cloning is cheap; the store is shared.
pub struct GradebookEngine<S> {
  store:  Arc<S>,
  config: EngineConfig,
}

impl<S> Clone for GradebookEngine<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: self.config.clone() }
  }
}

impl<S: GradebookStore> GradebookEngine<S> {
  pub fn new(store: Arc<S>, config: EngineConfig) -> Self { Self { store, config } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn config(&self) -> &EngineConfig { &self.config }
}

/// Lift a backend error into the domain taxonomy.
pub(crate) fn store_err<E: Into<gradebook_core::Error>>(err: E) -> gradebook_core::Error {
  err.into()
}

#[cfg(test)]
mod tests;
