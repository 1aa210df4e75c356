use crate::cli::BackendKind;
use crate::errors::{Result, SkinGenError};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub model: String,
    pub api_base: String,
    /// Name of the environment variable holding the provider key.
    pub api_key_env: String,
    /// Never read from or written to the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub webhook_url: String,
    pub local_model_path: Option<PathBuf>,
    pub max_length: usize,
    pub top_k: usize,
    pub temperature: f64,
    pub logo_path: PathBuf,
    pub illustration_path: PathBuf,
    pub out_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Remote,
            model: "gpt-3.5-turbo".into(),
            api_base: "https://api.openai.com".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            api_key: None,
            timeout_secs: None,
            webhook_url: "https://hooks.zapier.com/hooks/catch/xxxx/yyyy".into(),
            local_model_path: None,
            max_length: 300,
            top_k: 50,
            temperature: 0.7,
            logo_path: "assets/skingen_logo.png".into(),
            illustration_path: "assets/skincare_illustration.png".into(),
            out_dir: ".".into(),
        }
    }
}

impl Config {
    /// Defaults overlaid with the TOML file at `path`, if any.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let raw = fs::read_to_string(p).map_err(|e| {
                    SkinGenError::Configuration(format!("reading {}: {e}", p.display()))
                })?;
                Self::from_toml_str(&raw)
                    .map_err(|e| SkinGenError::Configuration(format!("{}: {e}", p.display())))
            }
        }
    }

    pub fn from_toml_str(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Pull the provider key from the process environment. An empty value
    /// counts as unset.
    pub fn resolve_api_key(&mut self) {
        self.api_key = std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
    }
}
