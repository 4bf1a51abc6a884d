use serde::Deserialize;

/// Tuning for class-wide recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Students recomputed concurrently per batch. 0 is treated as 1.
  pub batch_size:     usize,
  /// Pause between consecutive batches.
  pub batch_delay_ms: u64,
}

impl Default for EngineConfig {
  fn default() -> Self { Self { batch_size: 50, batch_delay_ms: 100 } }
}
