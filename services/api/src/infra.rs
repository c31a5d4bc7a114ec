use cardio_risk::assessment::{
    AssessmentService, ModelArtifact, ModelError, ModelScorer, RuleBasedScorer, ScorerKind,
};
use cardio_risk::config::ScoringConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) scorer: ScorerKind,
}

pub(crate) fn load_model_scorer(path: &Path) -> Result<ModelScorer, ModelError> {
    let artifact = ModelArtifact::from_path(path)?;
    ModelScorer::from_artifact(artifact)
}

/// Builds the assessment service for the server. A missing or broken model
/// artifact leaves the model scorer unloaded so `/predict` answers 500 rather
/// than the process refusing to start.
pub(crate) fn build_service(config: &ScoringConfig) -> AssessmentService {
    match config.scorer {
        ScorerKind::Rules => AssessmentService::new(Arc::new(RuleBasedScorer::new())),
        ScorerKind::Model => {
            let scorer = match config.model_path.as_deref() {
                Some(path) => match load_model_scorer(path) {
                    Ok(scorer) => {
                        info!(path = %path.display(), "loaded risk model artifact");
                        scorer
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "risk model failed to load");
                        ModelScorer::unloaded()
                    }
                },
                None => {
                    warn!("model scorer selected without CARDIO_MODEL_PATH");
                    ModelScorer::unloaded()
                }
            };
            AssessmentService::new(Arc::new(scorer))
        }
    }
}
