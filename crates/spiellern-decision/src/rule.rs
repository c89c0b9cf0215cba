//! Decision rules: named, prioritized predicates over the decision context.

use spiellern_core::DecisionContext;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Predicate a rule evaluates against the current context.
///
/// Implemented for any `Fn(&DecisionContext) -> bool` closure, so callers
/// can register scoped conditions without naming a type.
pub trait RulePredicate: Send + Sync {
    fn matches(&self, ctx: &DecisionContext) -> bool;
}

impl<F> RulePredicate for F
where
    F: Fn(&DecisionContext) -> bool + Send + Sync,
{
    fn matches(&self, ctx: &DecisionContext) -> bool {
        self(ctx)
    }
}

/// One rule owned by the decision engine.
///
/// Higher priority wins; the engine keeps its rule list sorted by priority
/// descending. `cooldown_secs <= 0` means the rule is always eligible.
pub struct DecisionRule {
    pub name: String,
    pub priority: i32,
    pub action_index: usize,
    pub cooldown_secs: f64,
    predicate: Box<dyn RulePredicate>,
}

impl DecisionRule {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        priority: i32,
        action_index: usize,
        cooldown_secs: f64,
        predicate: impl RulePredicate + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            action_index,
            cooldown_secs,
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the predicate, absorbing panics: a misbehaving predicate is
    /// logged and treated as "did not match" so `decide()` never aborts.
    pub(crate) fn matches_guarded(&self, ctx: &DecisionContext) -> bool {
        match catch_unwind(AssertUnwindSafe(|| self.predicate.matches(ctx))) {
            Ok(matched) => matched,
            Err(_) => {
                tracing::warn!(rule = %self.name, "rule predicate panicked, treating as no match");
                false
            }
        }
    }
}

impl fmt::Debug for DecisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionRule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("action_index", &self.action_index)
            .field("cooldown_secs", &self.cooldown_secs)
            .finish_non_exhaustive()
    }
}
