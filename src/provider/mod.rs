use async_trait::async_trait;
use std::time::Duration;

use crate::cli::BackendKind;
use crate::config::Config;
use crate::errors::{Result, SkinGenError};
use crate::profile::{RoutineResult, SkinProfile};
use crate::prompt;

pub mod local;
pub mod openai;

/// A text generator that turns a built prompt into a routine.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Prompt this backend expects for `profile`.
    fn prompt_for(&self, profile: &SkinProfile) -> String {
        prompt::build_prompt(profile)
    }

    async fn generate(&self, prompt: &str) -> Result<RoutineResult>;
}

pub type DynBackend = Box<dyn Backend + Send + Sync>;

pub fn make_backend(cfg: &Config) -> Result<DynBackend> {
    match cfg.backend {
        BackendKind::Remote => Ok(Box::new(openai::RemoteChatBackend::new(
            cfg.model.clone(),
            cfg.api_base.clone(),
            cfg.api_key.clone(),
            cfg.timeout_secs.map(Duration::from_secs),
        )?)),
        BackendKind::Local => {
            let path = cfg.local_model_path.as_deref().ok_or_else(|| {
                SkinGenError::Configuration(
                    "local backend selected but local_model_path is not set".into(),
                )
            })?;
            let params = local::SamplingParams {
                max_length: cfg.max_length,
                top_k: cfg.top_k,
                temperature: cfg.temperature,
            };
            params.validate()?;
            Ok(Box::new(local::LocalDecoderBackend::from_weights_file(path, params)?))
        }
    }
}
