//! watchman: a PreToolUse policy gate for AI coding agents.
//!
//! The gate reads one tool invocation as JSON from stdin, evaluates it
//! against a layered rule set drawn from configuration, and answers with an
//! allow/deny decision: stdout carries the decision JSON, the exit code is
//! the contract (0 allow, 2 deny, 1 engine failure). Denial is
//! authoritative; the host runtime aborts the tool call.
//!
//! # Architecture
//!
//! - **[`parse`]** — Shell parsing: tokenizer, command decomposition,
//!   pipeline segmentation for command-position matching.
//! - **[`paths`]** — Per-tool extraction of the paths a call would touch.
//! - **[`pattern`]** — Prefix and glob matchers shared by the rules.
//! - **[`rules`]** — The rule variants: protected oracle, workspace
//!   confinement, scope, versioning, incremental budget, invariants.
//! - **[`hooks`]** — External validator children with a JSON protocol and
//!   bounded timeouts.
//! - **[`eval`]** — The fixed-order pipeline composing all of the above.
//! - **[`config`]** — YAML configuration loading and merging.
//! - **[`state`]** — The small persisted reminder counter.
//! - **[`logging`]** — Best-effort decision logging.

/// Configuration types, loading, and merge logic.
pub mod config;
/// Evaluation pipeline: context, decision type, evaluator.
pub mod eval;
/// External validator hooks.
pub mod hooks;
/// File-based decision logging.
pub mod logging;
/// Shell command parsing.
pub mod parse;
/// Path-candidate extraction per tool.
pub mod paths;
/// Path prefix and glob matching.
pub mod pattern;
/// Policy rules.
pub mod rules;
/// Reminder counter state.
pub mod state;
