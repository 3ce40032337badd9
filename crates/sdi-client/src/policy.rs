//! Enforcement policy
//!
//! Framework-agnostic decision over an [`AnalysisResult`]. Adapters
//! apply the decision; they never hardcode a severity threshold.

use crate::types::{AnalysisResult, Severity};

/// What the adapter should do with an analyzed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Hand the request to the host handler, result attached for
    /// downstream observability.
    Allow,
    /// Short-circuit with a rejection response.
    Block,
}

/// Severity threshold that turns a detection into a block.
///
/// Defaults to [`Severity::Critical`]: only the maximum level blocks,
/// everything below passes through with the result attached.
#[derive(Debug, Clone, Copy)]
pub struct EnforcementPolicy {
    block_threshold: Severity,
}

impl Default for EnforcementPolicy {
    fn default() -> Self {
        Self {
            block_threshold: Severity::Critical,
        }
    }
}

impl EnforcementPolicy {
    /// Policy blocking at the given severity or above.
    pub fn block_at(threshold: Severity) -> Self {
        Self {
            block_threshold: threshold,
        }
    }

    /// The configured threshold.
    pub fn block_threshold(&self) -> Severity {
        self.block_threshold
    }

    /// Decide whether a result blocks the request.
    ///
    /// A result that detected nothing never blocks, whatever its
    /// severity field says.
    pub fn decide(&self, result: &AnalysisResult) -> Decision {
        if result.anomaly_detected && result.severity >= self.block_threshold {
            Decision::Block
        } else {
            Decision::Allow
        }
    }
}
