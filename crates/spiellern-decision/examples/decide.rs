//! Kleines Demo: ein Entscheidungszyklus mit Regeln und synthetischer
//! Modellvorhersage, Ausgabe als JSON-Zeile.
//!
//! Aufruf: `cargo run --package spiellern-decision --example decide`

use rand::prelude::*;
use serde::Serialize;
use spiellern_core::{DecisionContext, DecisionResult, GameState};
use spiellern_decision::{DecisionEngine, DecisionRule, EngineConfig};
use std::io;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Serialize)]
struct DecisionRecord {
    ts: String,
    context: DecisionContext,
    decision: DecisionResult,
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = DecisionEngine::new(EngineConfig::default());
    engine.add_rule(DecisionRule::new(
        "low hp flee",
        200,
        19,
        0.0,
        |ctx: &DecisionContext| ctx.health_fraction < 0.3,
    ));
    engine.add_rule(DecisionRule::new(
        "gather when idle",
        40,
        21,
        0.0,
        |ctx: &DecisionContext| ctx.game_state == GameState::Idle,
    ));

    // Synthetische Vorhersage anstelle eines echten Modells.
    let mut rng = thread_rng();
    let prediction: Vec<f64> = (0..32).map(|_| rng.gen::<f64>()).collect();

    let ctx = DecisionContext::new(GameState::Combat, 0.85, 1)?.with_prediction(prediction);
    let decision = engine.decide(&ctx);

    let record = DecisionRecord {
        ts: iso8601_now(),
        context: ctx,
        decision,
    };
    serde_json::to_writer_pretty(io::stdout(), &record)?;
    println!();

    Ok(())
}
