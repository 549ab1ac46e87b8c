//! Policy rules: orthogonal checks composed by the evaluator.
//!
//! Each rule is a variant of [`Rule`] with a single
//! `evaluate(&RuleContext) -> Decision` operation. The pipeline is a fixed
//! sequence of variants built from the enabled config switches, not a
//! runtime plug-in graph. Rules that do not apply to the current tool
//! return an allow and cost nothing.

/// Incremental change budget against the changed-file counter.
pub mod incremental;
/// Declarative coexistence / content / import / naming / required checks.
pub mod invariants;
/// Hardcoded always-deny locations.
pub mod protected;
/// Scope globs for file modifications.
pub mod scope;
/// Commit, branch, and VCS operation policy.
pub mod versioning;
/// Workspace confinement.
pub mod workspace;

pub use incremental::{ChangeCounter, IncrementalRule};
pub use invariants::InvariantsRule;
pub use protected::{PROTECTED_REASON, is_always_protected};
pub use scope::ScopeRule;
pub use versioning::VersioningRule;
pub use workspace::WorkspaceRule;

use crate::eval::{Decision, RuleContext};

/// A policy rule as a tagged variant. First denial wins; later rules never
/// see the call.
pub enum Rule<'cfg> {
    Workspace(WorkspaceRule<'cfg>),
    Scope(ScopeRule<'cfg>),
    Versioning(VersioningRule<'cfg>),
    Incremental(IncrementalRule),
    Invariants(InvariantsRule<'cfg>),
}

impl Rule<'_> {
    pub fn evaluate(&self, ctx: &RuleContext) -> Decision {
        match self {
            Rule::Workspace(rule) => rule.evaluate(ctx),
            Rule::Scope(rule) => rule.evaluate(ctx),
            Rule::Versioning(rule) => rule.evaluate(ctx),
            Rule::Incremental(rule) => rule.evaluate(ctx),
            Rule::Invariants(rule) => rule.evaluate(ctx),
        }
    }
}
