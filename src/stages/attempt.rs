use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result, Stage};
use crate::llm::InferenceBackend;

/// Send a prompt and validate the answer, retrying up to `max_retries` times
///
/// The last failure is returned once retries are exhausted: `Inference` when
/// the backend call failed, `MalformedOutput` when the answer did not validate.
pub(crate) async fn complete_validated<B, T, F>(
    backend: &B,
    stage: Stage,
    label: &str,
    system: &str,
    prompt: &str,
    max_retries: u32,
    validate: F,
) -> Result<T>
where
    B: InferenceBackend + ?Sized,
    F: Fn(&str) -> std::result::Result<T, String>,
{
    debug!("{}: prompt is {} characters", label, prompt.chars().count());

    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            info!("{}: retry {} of {}", label, attempt, max_retries);
        }

        match backend.complete(system, prompt).await {
            Ok(raw) => match validate(&raw) {
                Ok(value) => return Ok(value),
                Err(detail) => {
                    warn!("{} validation failed: {}", label, detail);
                    last_error = Some(AnalysisError::MalformedOutput { stage, detail });
                }
            },
            Err(e) => {
                warn!("{} request failed: {}", label, e);
                last_error = Some(AnalysisError::Inference {
                    stage,
                    detail: e.to_string(),
                });
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AnalysisError::Inference {
        stage,
        detail: "no attempt was made".to_string(),
    }))
}
