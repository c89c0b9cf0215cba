//! Demo of one full closed-loop tuning cycle: collect metrics, tune a
//! parameter, evaluate, and roll back on regression.
//!
//! Aufruf: `cargo run --package spiellern-tuning --example tuning_cycle`

use spiellern_tuning::{Aggressiveness, AutoTuner, PerformanceMetric};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut tuner = AutoTuner::new(true, Aggressiveness::Balanced);

    // Simulierte Beobachtungsphase: solide Leistung.
    for _ in 0..5 {
        tuner.collect_metric(PerformanceMetric::new(0.8, 0.9, 0, 0.7)?);
    }

    let mut record = tuner.tune_parameter("rule_priority_weight")?;
    println!(
        "tuned {}: {:.2} -> {:.2} ({})",
        record.parameter_name, record.old_value, record.new_value, record.reason
    );

    // Nach der Anpassung bricht die Leistung ein.
    for _ in 0..5 {
        tuner.collect_metric(PerformanceMetric::new(0.2, 0.4, 3, 0.2)?);
    }

    let kept = tuner.evaluate_and_rollback_if_needed(&mut record);
    println!(
        "adjustment kept: {kept}, current value: {:.2}",
        tuner
            .parameter("rule_priority_weight")
            .map(|p| p.current_value())
            .unwrap_or_default()
    );

    for (name, (current, default, delta)) in tuner.all_parameter_diff() {
        println!("{name}: current={current:.2} default={default:.2} delta={delta:+.2}");
    }

    Ok(())
}
