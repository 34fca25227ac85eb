//! Rule engine
//!
//! Rules are registered in a [`RuleRegistry`], selected and weighted by a
//! [`LintProfile`], run per file by the [`LintExecutor`] and summarized into a
//! [`LintReport`] with a pass/fail verdict.

pub mod executor;
pub mod profile;
pub mod report;
pub mod rule;
pub mod rules;
pub mod types;
pub mod verdict;

pub use executor::LintExecutor;
pub use profile::{LintProfile, ParallelismConfig, ThresholdConfig};
pub use report::{ReportFormat, ReportRenderer};
pub use rule::{Rule, RuleContext, RuleRegistry, RuleSettings};
pub use types::*;
pub use verdict::compute_verdict;
