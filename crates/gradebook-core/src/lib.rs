//! Core types and trait definitions for the gradebook engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the domain model, the assessment lookup rules, the pure aggregation math,
//! and the [`store::GradebookStore`] abstraction every backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assessment;
pub mod calc;
pub mod catalog;
pub mod error;
pub mod grade;
pub mod history;
pub mod lookup;
pub mod store;
pub mod term;

pub use error::{Error, ErrorKind, Result};
