//! The result type shared by every rule and the evaluator.

/// Outcome of evaluating a tool call: a verdict, the denial reason, and an
/// advisory warning that never affects the verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether the tool call may proceed.
    pub allowed: bool,
    /// Non-empty exactly when denied.
    pub reason: String,
    /// Advisory context attached to allowed outcomes.
    pub warning: String,
}

impl Decision {
    /// A plain allow.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
            warning: String::new(),
        }
    }

    /// A denial with the given reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            warning: String::new(),
        }
    }

    /// An allow carrying an advisory warning.
    pub fn advise(warning: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: String::new(),
            warning: warning.into(),
        }
    }

    /// Uppercase label for the decision log.
    pub fn label(&self) -> &'static str {
        if self.allowed { "ALLOW" } else { "DENY" }
    }
}
