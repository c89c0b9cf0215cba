//! The decision engine: combines prioritized rules, a per-state weight
//! table and the active model's raw prediction into one action per call.

use crate::config::{DecisionPolicy, EngineConfig};
use crate::rule::DecisionRule;
use serde::Serialize;
use spiellern_core::{ActionCatalog, DecisionContext, DecisionResult, DecisionSource};
use spiellern_models::HotSwapController;
use spiellern_tuning::AutoTuner;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;

/// Candidate actions recorded per decision.
const CANDIDATE_COUNT: usize = 5;

/// One entry of the bounded decision log.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionLogEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub context: DecisionContext,
    /// `(action_index, score)` pairs considered for this decision.
    pub candidates: Vec<(usize, f64)>,
    pub result: DecisionResult,
}

/// Per-source decision counts derived from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecisionStats {
    pub total_decisions: usize,
    pub rule_decisions: usize,
    pub model_decisions: usize,
    pub mixed_decisions: usize,
    pub rule_count: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OutcomeCounters {
    pub(crate) total: u64,
    pub(crate) succeeded: u64,
    pub(crate) stuck: u32,
}

pub struct DecisionEngine {
    pub(crate) config: EngineConfig,
    catalog: ActionCatalog,
    /// Live blend weights; start from the config and may be re-tuned.
    pub(crate) rule_weight: f64,
    pub(crate) model_weight: f64,
    /// Sorted by priority descending; re-sorted on insert.
    rules: Vec<DecisionRule>,
    /// action index → last executed.
    action_cooldowns: HashMap<usize, Instant>,
    /// rule name → last fired.
    rule_cooldowns: HashMap<String, Instant>,
    log: VecDeque<DecisionLogEntry>,
    controller: Option<Arc<HotSwapController>>,
    pub(crate) tuner: Option<AutoTuner>,
    pub(crate) outcome: OutcomeCounters,
    pub(crate) last_tune: Option<Instant>,
}

impl DecisionEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_catalog(config, ActionCatalog::standard())
    }

    #[must_use]
    pub fn with_catalog(config: EngineConfig, catalog: ActionCatalog) -> Self {
        let rule_weight = config.rule_weight;
        let model_weight = config.model_weight;
        tracing::info!(policy = %config.policy, rule_weight, model_weight, "decision engine ready");
        Self {
            config,
            catalog,
            rule_weight,
            model_weight,
            rules: Vec::new(),
            action_cooldowns: HashMap::new(),
            rule_cooldowns: HashMap::new(),
            log: VecDeque::new(),
            controller: None,
            tuner: None,
            outcome: OutcomeCounters::default(),
            last_tune: None,
        }
    }

    /// Attach a hot-swap controller so `decide()` can request predictions
    /// for contexts that carry a frame but no precomputed vector.
    #[must_use]
    pub fn with_controller(mut self, controller: Arc<HotSwapController>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Attach an auto-tuner; outcome feedback then drives parameter tuning.
    #[must_use]
    pub fn with_tuner(mut self, tuner: AutoTuner) -> Self {
        self.tuner = Some(tuner);
        self
    }

    // ----------------------------------------------------------------
    // Rule management
    // ----------------------------------------------------------------

    pub fn add_rule(&mut self, rule: DecisionRule) {
        tracing::debug!(rule = %rule.name, priority = rule.priority, "rule added");
        self.rules.push(rule);
        // Stable sort: equal priorities keep insertion order.
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn remove_rule(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        let removed = self.rules.len() < before;
        if removed {
            self.rule_cooldowns.remove(name);
            tracing::debug!(name, "rule removed");
        }
        removed
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
        self.rule_cooldowns.clear();
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    // ----------------------------------------------------------------
    // Deciding
    // ----------------------------------------------------------------

    /// Select one action for the given context. Never fails: predicate
    /// panics count as non-matches and a missing predictor degrades to
    /// table-weight scoring.
    pub fn decide(&mut self, ctx: &DecisionContext) -> DecisionResult {
        self.decide_at(ctx, Instant::now())
    }

    fn decide_at(&mut self, ctx: &DecisionContext, now: Instant) -> DecisionResult {
        let mut candidates = Vec::new();
        let result = match self.config.policy {
            DecisionPolicy::RuleFirst => self.decide_rule_first(ctx, now, &mut candidates),
            DecisionPolicy::ModelFirst => self.decide_model_first(ctx, now, &mut candidates),
            DecisionPolicy::HybridWeighted => self.decide_hybrid(ctx, now, &mut candidates),
        };

        if self.config.logging_enabled && self.config.log_capacity > 0 {
            if self.log.len() == self.config.log_capacity {
                self.log.pop_front();
            }
            self.log.push_back(DecisionLogEntry {
                timestamp: OffsetDateTime::now_utc(),
                context: ctx.clone(),
                candidates,
                result: result.clone(),
            });
        }
        result
    }

    /// Rules in priority order, model as the fallback.
    fn decide_rule_first(
        &mut self,
        ctx: &DecisionContext,
        now: Instant,
        candidates: &mut Vec<(usize, f64)>,
    ) -> DecisionResult {
        if let Some(emergency) = self.check_emergency(ctx, now) {
            candidates.push((emergency.action_index, emergency.confidence));
            return emergency;
        }
        if let Some(rule_result) = self.apply_rules(ctx, now) {
            candidates.push((rule_result.action_index, rule_result.confidence));
            return rule_result;
        }
        self.apply_model(ctx, now, candidates)
    }

    /// Model only; plain rules are bypassed, the emergency check is not.
    fn decide_model_first(
        &mut self,
        ctx: &DecisionContext,
        now: Instant,
        candidates: &mut Vec<(usize, f64)>,
    ) -> DecisionResult {
        if let Some(emergency) = self.check_emergency(ctx, now) {
            candidates.push((emergency.action_index, emergency.confidence));
            return emergency;
        }
        self.apply_model(ctx, now, candidates)
    }

    /// Rules and model evaluated independently, conflicts resolved by
    /// weighted comparison.
    fn decide_hybrid(
        &mut self,
        ctx: &DecisionContext,
        now: Instant,
        candidates: &mut Vec<(usize, f64)>,
    ) -> DecisionResult {
        if let Some(emergency) = self.check_emergency(ctx, now) {
            candidates.push((emergency.action_index, emergency.confidence));
            return emergency;
        }

        let rule_result = self.apply_rules(ctx, now);
        let model_result = self.apply_model(ctx, now, candidates);

        match rule_result {
            Some(rule_result) => {
                candidates.push((rule_result.action_index, rule_result.confidence));
                self.resolve_conflict(rule_result, model_result)
            }
            None => model_result,
        }
    }

    /// Low health or getting surrounded overrides everything, provided the
    /// emergency action itself is off cooldown.
    fn check_emergency(&self, ctx: &DecisionContext, now: Instant) -> Option<DecisionResult> {
        let emergency = &self.config.emergency;
        if !self.action_ready(emergency.emergency_action, now) {
            return None;
        }

        let reason = if ctx.health_fraction < emergency.low_health_threshold {
            format!("emergency: low health ({:.0}%)", ctx.health_fraction * 100.0)
        } else if ctx.nearby_enemy_count >= emergency.surround_threshold {
            format!("emergency: surrounded ({} enemies)", ctx.nearby_enemy_count)
        } else {
            return None;
        };

        tracing::debug!(%reason, action = emergency.emergency_action, "emergency rule fired");
        Some(DecisionResult {
            action_index: emergency.emergency_action,
            action_name: self.catalog.name(emergency.emergency_action),
            source: DecisionSource::Rule,
            confidence: 1.0,
            reason,
        })
    }

    /// First matching rule in priority order, skipping cooldown-blocked
    /// rules and actions. A match starts the rule's own cooldown.
    fn apply_rules(&mut self, ctx: &DecisionContext, now: Instant) -> Option<DecisionResult> {
        let mut winner: Option<(String, usize)> = None;
        for rule in &self.rules {
            if !self.rule_ready(rule, now) {
                continue;
            }
            if !self.action_ready(rule.action_index, now) {
                continue;
            }
            if rule.matches_guarded(ctx) {
                winner = Some((rule.name.clone(), rule.action_index));
                break;
            }
        }

        let (name, action_index) = winner?;
        self.rule_cooldowns.insert(name.clone(), now);
        Some(DecisionResult {
            action_index,
            action_name: self.catalog.name(action_index),
            source: DecisionSource::Rule,
            confidence: 1.0,
            reason: format!("rule matched: {name}"),
        })
    }

    /// Score every action from the state weight table, blended with the raw
    /// model prediction when one is available, and pick the argmax. Ties
    /// resolve to the lowest action index; a fully cooldown-blocked board
    /// yields the no-op action with zero confidence.
    fn apply_model(
        &self,
        ctx: &DecisionContext,
        now: Instant,
        candidates: &mut Vec<(usize, f64)>,
    ) -> DecisionResult {
        let n = self.catalog.len();
        let weights: Vec<f64> = (0..n)
            .map(|i| {
                self.config
                    .state_weights
                    .weight(ctx.game_state, self.catalog.kind(i))
            })
            .collect();

        let prediction = self.obtain_prediction(ctx);
        let mut scores: Vec<f64> = match &prediction {
            Some(prediction) => (0..n)
                .map(|i| {
                    self.model_weight * prediction.get(i).copied().unwrap_or(0.0)
                        + self.rule_weight * weights[i]
                })
                .collect(),
            None => weights,
        };

        for (index, score) in scores.iter_mut().enumerate() {
            if !self.action_ready(index, now) {
                *score = 0.0;
            }
        }

        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if best <= 0.0 {
            return DecisionResult {
                action_index: self.config.noop_action,
                action_name: self.catalog.name(self.config.noop_action),
                source: DecisionSource::Model,
                confidence: 0.0,
                reason: "all actions on cooldown".to_string(),
            };
        }

        // First occurrence of the maximum: ties go to the lowest index.
        let best_index = scores
            .iter()
            .position(|&s| s == best)
            .unwrap_or(self.config.noop_action);

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        });
        candidates.extend(order.into_iter().take(CANDIDATE_COUNT).map(|i| (i, scores[i])));

        let total: f64 = scores.iter().sum();
        let confidence = (best / total.max(1.0)).min(1.0);

        DecisionResult {
            action_index: best_index,
            action_name: self.catalog.name(best_index),
            source: DecisionSource::Model,
            confidence,
            reason: format!("model prediction: state={}", ctx.game_state),
        }
    }

    /// Prediction from the context, or from the hot-swap controller when the
    /// context carries a frame. Any failure degrades to table-weight-only
    /// scoring.
    fn obtain_prediction(&self, ctx: &DecisionContext) -> Option<Vec<f64>> {
        if let Some(prediction) = &ctx.model_prediction {
            if !prediction.is_empty() {
                return Some(prediction.clone());
            }
        }
        let frame = ctx.frame.as_ref()?;
        let controller = self.controller.as_ref()?;
        match controller.predict(frame) {
            Ok(prediction) => Some(prediction),
            Err(error) => {
                tracing::debug!(%error, "predictor unavailable, falling back to table weights");
                None
            }
        }
    }

    /// Rule and model disagree (or agree) on an action; merge per the
    /// configured blend weights. Matched rules carry confidence 1.0, so the
    /// comparison is effectively rule_weight against model confidence times
    /// model_weight, with ties going to the rule.
    fn resolve_conflict(
        &self,
        rule_result: DecisionResult,
        model_result: DecisionResult,
    ) -> DecisionResult {
        if rule_result.action_index == model_result.action_index {
            return DecisionResult {
                action_index: rule_result.action_index,
                action_name: rule_result.action_name,
                source: DecisionSource::Mixed,
                confidence: rule_result.confidence.max(model_result.confidence),
                reason: format!("rule and model agree: {}", rule_result.reason),
            };
        }

        let rule_score = rule_result.confidence * self.rule_weight;
        let model_score = model_result.confidence * self.model_weight;
        if rule_score >= model_score {
            DecisionResult {
                source: DecisionSource::Mixed,
                reason: format!("rule preferred: {}", rule_result.reason),
                ..rule_result
            }
        } else {
            DecisionResult {
                source: DecisionSource::Mixed,
                reason: format!("model preferred: {}", model_result.reason),
                ..model_result
            }
        }
    }

    // ----------------------------------------------------------------
    // Cooldowns
    // ----------------------------------------------------------------

    /// Start (or refresh) the executed action's cooldown.
    pub fn record_action_executed(&mut self, action_index: usize) {
        self.record_action_executed_at(action_index, Instant::now());
    }

    fn record_action_executed_at(&mut self, action_index: usize, now: Instant) {
        self.action_cooldowns.insert(action_index, now);
        tracing::debug!(action_index, "action execution recorded");
    }

    /// Whether an action is off cooldown. Actions without a configured
    /// cooldown are always eligible.
    fn action_ready(&self, action_index: usize, now: Instant) -> bool {
        let cooldown = self
            .config
            .action_cooldowns
            .get(&action_index)
            .copied()
            .unwrap_or(0.0);
        if cooldown <= 0.0 {
            return true;
        }
        match self.action_cooldowns.get(&action_index) {
            Some(last) => now
                .checked_duration_since(*last)
                .is_some_and(|elapsed| elapsed.as_secs_f64() >= cooldown),
            None => true,
        }
    }

    fn rule_ready(&self, rule: &DecisionRule, now: Instant) -> bool {
        if rule.cooldown_secs <= 0.0 {
            return true;
        }
        match self.rule_cooldowns.get(&rule.name) {
            Some(last) => now
                .checked_duration_since(*last)
                .is_some_and(|elapsed| elapsed.as_secs_f64() >= rule.cooldown_secs),
            None => true,
        }
    }

    pub fn reset_cooldowns(&mut self) {
        self.action_cooldowns.clear();
        self.rule_cooldowns.clear();
        tracing::debug!("cooldowns reset");
    }

    // ----------------------------------------------------------------
    // Log & stats
    // ----------------------------------------------------------------

    /// The most recent `n` log entries, oldest first.
    #[must_use]
    pub fn decision_log(&self, n: usize) -> Vec<DecisionLogEntry> {
        let skip = self.log.len().saturating_sub(n);
        self.log.iter().skip(skip).cloned().collect()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn stats(&self) -> DecisionStats {
        let mut stats = DecisionStats {
            total_decisions: self.log.len(),
            rule_decisions: 0,
            model_decisions: 0,
            mixed_decisions: 0,
            rule_count: self.rules.len(),
        };
        for entry in &self.log {
            match entry.result.source {
                DecisionSource::Rule => stats.rule_decisions += 1,
                DecisionSource::Model => stats.model_decisions += 1,
                DecisionSource::Mixed => stats.mixed_decisions += 1,
            }
        }
        stats
    }

    #[must_use]
    pub fn policy(&self) -> DecisionPolicy {
        self.config.policy
    }

    #[must_use]
    pub fn rule_weight(&self) -> f64 {
        self.rule_weight
    }

    #[must_use]
    pub fn model_weight(&self) -> f64 {
        self.model_weight
    }

    #[must_use]
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("policy", &self.config.policy)
            .field("rules", &self.rules.len())
            .field("rule_weight", &self.rule_weight)
            .field("model_weight", &self.model_weight)
            .field("log", &self.log.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spiellern_core::GameState;
    use std::time::Duration;

    fn ctx(state: GameState, health: f64, enemies: u32) -> DecisionContext {
        DecisionContext::new(state, health, enemies).unwrap()
    }

    fn engine(policy: DecisionPolicy) -> DecisionEngine {
        DecisionEngine::new(EngineConfig {
            policy,
            ..EngineConfig::default()
        })
    }

    fn always(_: &DecisionContext) -> bool {
        true
    }

    // ----------------------------------------------------------------
    // Priority & policies
    // ----------------------------------------------------------------

    #[test]
    fn higher_priority_rule_wins() {
        for policy in [DecisionPolicy::RuleFirst, DecisionPolicy::HybridWeighted] {
            let mut engine = engine(policy);
            engine.add_rule(DecisionRule::new("low", 20, 10, 0.0, always));
            engine.add_rule(DecisionRule::new("high", 150, 15, 0.0, always));

            let result = engine.decide(&ctx(GameState::Combat, 0.9, 0));
            assert_eq!(result.action_index, 15, "policy {policy}");
            assert_eq!(result.source, DecisionSource::Rule, "policy {policy}");
            assert!(result.reason.contains("high"));
        }
    }

    #[test]
    fn equal_priority_keeps_insertion_order() {
        let mut engine = engine(DecisionPolicy::RuleFirst);
        engine.add_rule(DecisionRule::new("first", 50, 9, 0.0, always));
        engine.add_rule(DecisionRule::new("second", 50, 10, 0.0, always));
        let result = engine.decide(&ctx(GameState::Combat, 0.9, 0));
        assert_eq!(result.action_index, 9);
    }

    #[test]
    fn model_first_bypasses_plain_rules() {
        let mut engine = engine(DecisionPolicy::ModelFirst);
        engine.add_rule(DecisionRule::new("ignored", 500, 10, 0.0, always));

        let prediction = one_hot(9, 1.0);
        let result = engine.decide(&ctx(GameState::Combat, 0.9, 0).with_prediction(prediction));
        assert_eq!(result.source, DecisionSource::Model);
        assert_ne!(result.action_index, 10);
    }

    #[test]
    fn model_first_still_honors_the_emergency_check() {
        let mut engine = engine(DecisionPolicy::ModelFirst);
        let result = engine.decide(&ctx(GameState::Combat, 0.1, 0));
        assert_eq!(result.action_index, ActionCatalog::DODGE_ACTION);
        assert_eq!(result.source, DecisionSource::Rule);
        assert!((result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rule_first_runs_the_emergency_check_before_rules() {
        let mut engine = engine(DecisionPolicy::RuleFirst);
        engine.add_rule(DecisionRule::new("attack", 500, 9, 0.0, always));
        let result = engine.decide(&ctx(GameState::Combat, 0.1, 0));
        assert_eq!(result.action_index, ActionCatalog::DODGE_ACTION);
        assert!(result.reason.contains("low health"));
    }

    #[test]
    fn surround_threshold_triggers_the_emergency() {
        let mut engine = engine(DecisionPolicy::HybridWeighted);
        let result = engine.decide(&ctx(GameState::Combat, 0.9, 5));
        assert_eq!(result.action_index, ActionCatalog::DODGE_ACTION);
        assert!(result.reason.contains("surrounded"));
    }

    // ----------------------------------------------------------------
    // Rule failure semantics
    // ----------------------------------------------------------------

    #[test]
    fn panicking_rule_falls_through_to_the_next() {
        let mut engine = engine(DecisionPolicy::RuleFirst);
        engine.add_rule(DecisionRule::new(
            "broken",
            200,
            10,
            0.0,
            |_: &DecisionContext| -> bool { panic!("predicate bug") },
        ));
        engine.add_rule(DecisionRule::new("fallback", 100, 11, 0.0, always));

        let result = engine.decide(&ctx(GameState::Combat, 0.9, 0));
        assert_eq!(result.action_index, 11);
        assert_eq!(result.source, DecisionSource::Rule);
    }

    // ----------------------------------------------------------------
    // Model evaluation
    // ----------------------------------------------------------------

    fn one_hot(index: usize, value: f64) -> Vec<f64> {
        let mut v = vec![0.0; 32];
        v[index] = value;
        v
    }

    #[test]
    fn model_evaluation_blends_prediction_and_table_weights() {
        let mut engine = engine(DecisionPolicy::ModelFirst);
        // Strong prediction for a skill in combat, where skills also carry
        // the highest table weight.
        let result =
            engine.decide(&ctx(GameState::Combat, 0.9, 0).with_prediction(one_hot(12, 1.0)));
        assert_eq!(result.action_index, 12);
        assert_eq!(result.source, DecisionSource::Model);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn without_prediction_table_weights_decide_alone() {
        let mut engine = engine(DecisionPolicy::ModelFirst);
        let result = engine.decide(&ctx(GameState::Moving, 0.9, 0));
        // Movement weighs 2.0 in the moving state; the argmax tie among
        // movement actions resolves to the lowest index.
        assert_eq!(result.action_index, 0);
        assert_eq!(result.source, DecisionSource::Model);
    }

    #[test]
    fn argmax_ties_resolve_to_the_lowest_index() {
        let mut engine = engine(DecisionPolicy::ModelFirst);
        let mut prediction = vec![0.0; 32];
        prediction[14] = 0.9;
        prediction[10] = 0.9;
        let result =
            engine.decide(&ctx(GameState::Combat, 0.9, 0).with_prediction(prediction));
        assert_eq!(result.action_index, 10);
    }

    #[test]
    fn all_actions_on_cooldown_yields_the_noop_action() {
        let mut config = EngineConfig {
            policy: DecisionPolicy::ModelFirst,
            ..EngineConfig::default()
        };
        for i in 0..32 {
            config.action_cooldowns.insert(i, 60.0);
        }
        let mut engine = DecisionEngine::new(config);
        for i in 0..32 {
            engine.record_action_executed(i);
        }

        let result = engine.decide(&ctx(GameState::Combat, 0.9, 0));
        assert_eq!(result.action_index, ActionCatalog::NOOP_ACTION);
        assert_eq!(result.source, DecisionSource::Model);
        assert!(result.confidence.abs() < 1e-9);
        assert_eq!(result.reason, "all actions on cooldown");
    }

    // ----------------------------------------------------------------
    // Hybrid conflict resolution
    // ----------------------------------------------------------------

    #[test]
    fn agreement_merges_with_max_confidence() {
        let mut engine = engine(DecisionPolicy::HybridWeighted);
        engine.add_rule(DecisionRule::new("skill one", 100, 9, 0.0, always));
        // Prediction also points at action 9.
        let result =
            engine.decide(&ctx(GameState::Combat, 0.9, 0).with_prediction(one_hot(9, 1.0)));
        assert_eq!(result.action_index, 9);
        assert_eq!(result.source, DecisionSource::Mixed);
        assert!((result.confidence - 1.0).abs() < 1e-9, "max of both sides");
    }

    #[test]
    fn disagreement_compares_weighted_scores_rule_wins_by_default() {
        // rule score = 1.0 × 0.6 always beats model confidence × 0.4.
        let mut engine = engine(DecisionPolicy::HybridWeighted);
        engine.add_rule(DecisionRule::new("dodge now", 100, 19, 0.0, always));
        let result =
            engine.decide(&ctx(GameState::Combat, 0.9, 0).with_prediction(one_hot(9, 1.0)));
        assert_eq!(result.action_index, 19);
        assert_eq!(result.source, DecisionSource::Mixed);
        assert!(result.reason.contains("rule preferred"));
    }

    #[test]
    fn disagreement_prefers_the_model_when_weights_say_so() {
        let mut config = EngineConfig {
            policy: DecisionPolicy::HybridWeighted,
            rule_weight: 0.1,
            model_weight: 0.9,
            ..EngineConfig::default()
        };
        // Flat table so the model's confidence stays high.
        config.state_weights = crate::config::StateWeightTable::new();
        let mut engine = DecisionEngine::new(config);
        engine.add_rule(DecisionRule::new("weak rule", 100, 19, 0.0, always));

        let result =
            engine.decide(&ctx(GameState::Combat, 0.9, 0).with_prediction(one_hot(9, 30.0)));
        assert_eq!(result.source, DecisionSource::Mixed);
        assert_eq!(result.action_index, 9);
        assert!(result.reason.contains("model preferred"));
    }

    // ----------------------------------------------------------------
    // Cooldowns
    // ----------------------------------------------------------------

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let mut config = EngineConfig::default();
        config.action_cooldowns.insert(9, 0.5);
        let mut engine = DecisionEngine::new(config);

        let t0 = Instant::now();
        assert!(engine.action_ready(9, t0), "eligible before execution");

        engine.record_action_executed_at(9, t0);
        assert!(!engine.action_ready(9, t0), "blocked immediately after");
        assert!(
            !engine.action_ready(9, t0 + Duration::from_millis(250)),
            "still blocked mid-cooldown"
        );
        assert!(
            engine.action_ready(9, t0 + Duration::from_millis(500)),
            "eligible once the cooldown elapsed (inclusive)"
        );
    }

    #[test]
    fn zero_cooldown_actions_are_always_eligible() {
        let mut engine = engine(DecisionPolicy::RuleFirst);
        let t0 = Instant::now();
        engine.record_action_executed_at(9, t0);
        assert!(engine.action_ready(9, t0), "no configured cooldown");
    }

    #[test]
    fn rule_cooldown_suppresses_a_recently_fired_rule() {
        let mut engine = engine(DecisionPolicy::RuleFirst);
        engine.add_rule(DecisionRule::new("burst", 100, 9, 30.0, always));
        engine.add_rule(DecisionRule::new("filler", 10, 0, 0.0, always));

        let t0 = Instant::now();
        let first = engine.decide_at(&ctx(GameState::Combat, 0.9, 0), t0);
        assert_eq!(first.action_index, 9);

        // Immediately after, the burst rule is inside its own cooldown.
        let second = engine.decide_at(&ctx(GameState::Combat, 0.9, 0), t0);
        assert_eq!(second.action_index, 0, "falls through to the filler rule");

        let third = engine.decide_at(&ctx(GameState::Combat, 0.9, 0), t0 + Duration::from_secs(31));
        assert_eq!(third.action_index, 9, "eligible again after the cooldown");
    }

    #[test]
    fn reset_cooldowns_clears_both_tables() {
        let mut config = EngineConfig::default();
        config.action_cooldowns.insert(9, 60.0);
        let mut engine = DecisionEngine::new(config);
        let t0 = Instant::now();
        engine.record_action_executed_at(9, t0);
        assert!(!engine.action_ready(9, t0));

        engine.reset_cooldowns();
        assert!(engine.action_ready(9, t0));
    }

    // ----------------------------------------------------------------
    // Decision log
    // ----------------------------------------------------------------

    #[test]
    fn every_decision_appends_one_log_entry() {
        let mut engine = engine(DecisionPolicy::HybridWeighted);
        for _ in 0..7 {
            engine.decide(&ctx(GameState::Combat, 0.9, 0));
        }
        let log = engine.decision_log(100);
        assert_eq!(log.len(), 7);
        for entry in &log {
            assert!(!entry.candidates.is_empty());
            assert_eq!(entry.context.game_state, GameState::Combat);
        }
    }

    #[test]
    fn log_is_bounded_by_capacity() {
        let mut engine = DecisionEngine::new(EngineConfig {
            log_capacity: 5,
            ..EngineConfig::default()
        });
        for _ in 0..12 {
            engine.decide(&ctx(GameState::Idle, 0.9, 0));
        }
        assert_eq!(engine.decision_log(100).len(), 5);
    }

    #[test]
    fn candidates_record_the_top_scores() {
        let mut engine = engine(DecisionPolicy::ModelFirst);
        let result =
            engine.decide(&ctx(GameState::Combat, 0.9, 0).with_prediction(one_hot(9, 1.0)));
        let log = engine.decision_log(1);
        let entry = &log[0];
        assert_eq!(entry.candidates.len(), 5, "top five scores recorded");
        assert_eq!(entry.candidates[0].0, result.action_index);
        assert!(entry.candidates[0].1 >= entry.candidates[1].1, "sorted descending");
        assert_eq!(entry.result, result);
    }

    #[test]
    fn stats_count_sources() {
        let mut engine = engine(DecisionPolicy::RuleFirst);
        engine.add_rule(DecisionRule::new("combat only", 100, 9, 0.0, |c: &DecisionContext| {
            c.game_state == GameState::Combat
        }));

        engine.decide(&ctx(GameState::Combat, 0.9, 0));
        engine.decide(&ctx(GameState::Moving, 0.9, 0));

        let stats = engine.stats();
        assert_eq!(stats.total_decisions, 2);
        assert_eq!(stats.rule_decisions, 1);
        assert_eq!(stats.model_decisions, 1);
        assert_eq!(stats.mixed_decisions, 0);
        assert_eq!(stats.rule_count, 1);
    }
}
