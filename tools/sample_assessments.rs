//! Sample Assessment Generator
//!
//! Synthesizes benign- and malignant-leaning FNA measurement sets, scores them
//! through the loaded model artifact and prints a risk distribution summary.

use anyhow::Context;
use breast_cancer_risk::{
    config::AppConfig,
    feature_catalog::{self, FeatureSpec},
    metrics::AssessmentMetrics,
    models::{ModelArtifact, RiskScorer},
    types::{DiagnosisClass, FeatureVector},
};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Typical benign profile, in catalog order
const BENIGN_PROFILE: [f64; 20] = [
    12.1, 17.9, 78.0, 463.0, 0.0925, 0.080, 0.046, 0.0257, 0.174, 0.0629, 13.4, 23.5, 87.0, 558.0,
    0.125, 0.183, 0.166, 0.074, 0.270, 0.079,
];

/// Typical malignant profile, in catalog order
const MALIGNANT_PROFILE: [f64; 20] = [
    17.5, 21.6, 115.0, 978.0, 0.103, 0.145, 0.161, 0.088, 0.193, 0.0627, 21.1, 29.3, 141.0,
    1422.0, 0.145, 0.375, 0.451, 0.182, 0.323, 0.0915,
];

/// Measurement generator for exercising the scorer
struct MeasurementGenerator {
    rng: rand::rngs::ThreadRng,
    /// Relative spread around the profile value
    spread: f64,
}

impl MeasurementGenerator {
    fn new(spread: f64) -> Self {
        Self {
            rng: rand::thread_rng(),
            spread,
        }
    }

    fn generate(&mut self, profile: &[f64; 20]) -> FeatureVector {
        feature_catalog::feature_specs()
            .iter()
            .zip(profile)
            .map(|(spec, &center)| (spec.name, self.jitter(spec, center)))
            .collect()
    }

    /// Perturb within the spread, clamped to the advisory input range
    fn jitter(&mut self, spec: &FeatureSpec, center: f64) -> f64 {
        let factor = 1.0 + self.rng.gen_range(-self.spread..=self.spread);
        (center * factor).clamp(spec.min, spec.max)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_assessments=info".parse()?),
        )
        .init();

    info!("Starting Sample Assessment Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/config.toml");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let malignant_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.37);
    let spread: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.15);

    anyhow::ensure!(
        (0.0..=1.0).contains(&malignant_rate),
        "malignant rate must be within [0, 1]"
    );
    anyhow::ensure!(
        (0.0..1.0).contains(&spread),
        "spread must be within [0, 1)"
    );

    let config = AppConfig::load_from_path(config_path)?;
    info!(
        config = %config_path,
        count = count,
        malignant_rate = malignant_rate,
        spread = spread,
        "Configuration loaded"
    );

    let artifact = ModelArtifact::load(&config.artifacts.model_path, config.artifacts.onnx_threads)
        .context("Failed to load model artifact")?;
    let scorer = RiskScorer::new(Arc::new(artifact), config.risk_levels);
    let metrics = AssessmentMetrics::new();

    let mut generator = MeasurementGenerator::new(spread);
    let mut rng = rand::thread_rng();

    let mut benign_count = 0;
    let mut malignant_count = 0;
    let mut disagreements = 0;

    for i in 0..count {
        let (expected, features) = if rng.gen_bool(malignant_rate) {
            malignant_count += 1;
            (DiagnosisClass::Malignant, generator.generate(&MALIGNANT_PROFILE))
        } else {
            benign_count += 1;
            (DiagnosisClass::Benign, generator.generate(&BENIGN_PROFILE))
        };

        let start = Instant::now();
        let result = match scorer.score(&features) {
            Ok(result) => result,
            Err(e) => {
                warn!(sample = i + 1, error = %e, "Scoring failed");
                metrics.record_rejection();
                continue;
            }
        };
        metrics.record_assessment(start.elapsed(), result.probability_malignant, result.risk_level);

        if result.predicted_class != expected {
            disagreements += 1;
        }

        if i == 0 || (i + 1) % 25 == 0 {
            info!(
                "Sample {} ({}):\n{}",
                i + 1,
                expected.as_str(),
                serde_json::to_string_pretty(&result)?
            );
        }
    }

    info!(
        "Completed! Scored {} samples ({} benign, {} malignant, {} predicted against profile)",
        count, benign_count, malignant_count, disagreements
    );
    metrics.print_summary();

    Ok(())
}
