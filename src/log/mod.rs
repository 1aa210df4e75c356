use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::errors::Result;
use crate::profile::{RoutineResult, SkinProfile};

pub fn init_tracing(debug: bool) {
    let default = if debug { "skingen=debug,info" } else { "skingen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub backend: &'a str,
    pub profile: &'a SkinProfile,
    pub prompt: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerationResponse<'a> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routine: Option<&'a RoutineResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: PathBuf,
    pub response: PathBuf,
}

pub fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".skingen").join("tx").join(tx.to_string())
}

/// Archive one generation under `<root>/.skingen/tx/<id>/`.
pub fn save_transcript(
    root: &Path,
    req: &GenerationRequest<'_>,
    resp: &GenerationResponse<'_>,
) -> Result<SavedPaths> {
    let dir = tx_dir(root, req.id);
    fs::create_dir_all(&dir)?;

    let request = dir.join("generation.request.json");
    fs::write(&request, to_string_pretty(req).map_err(std::io::Error::other)?)?;

    let response = dir.join("generation.response.json");
    fs::write(&response, to_string_pretty(resp).map_err(std::io::Error::other)?)?;

    Ok(SavedPaths { dir, request, response })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Goal, SkinType};

    #[test]
    fn writes_request_and_response() {
        let root = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let profile = SkinProfile::new(SkinType::Oily, Goal::Glow, None);
        let routine = RoutineResult::new("Morning: rinse");
        let req = GenerationRequest {
            id,
            timestamp: Utc::now(),
            backend: "openai",
            profile: &profile,
            prompt: "I have Oily skin",
        };
        let resp = GenerationResponse { id, timestamp: Utc::now(), routine: Some(&routine), error: None };

        let saved = save_transcript(root.path(), &req, &resp).unwrap();
        assert_eq!(saved.dir, root.path().join(".skingen/tx").join(id.to_string()));

        let req_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&saved.request).unwrap()).unwrap();
        assert_eq!(req_json["profile"]["skin_type"], "oily");
        assert_eq!(req_json["backend"], "openai");

        let resp_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&saved.response).unwrap()).unwrap();
        assert_eq!(resp_json["routine"]["text"], "Morning: rinse");
        assert!(resp_json.get("error").is_none());
    }
}
