use serde_json::json;
use skingen::cli::BackendKind;
use skingen::config::Config;
use skingen::provider::{self, Backend};
use skingen::{Goal, SkinProfile, SkinType};

#[tokio::test]
async fn local_backend_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("bigram.json");
    // "Morning Routine:" is always followed by " Cleanse" then end of text.
    std::fs::write(
        &weights,
        json!({
            "vocab": ["<eos>", "<unk>", "Morning", " Routine", ":", " Cleanse"],
            "eos": "<eos>",
            "unk": "<unk>",
            "logits": [
                [50.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [50.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [50.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [50.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 0.0, 50.0],
                [50.0, 0.0, 0.0, 0.0, 0.0, 0.0]
            ]
        })
        .to_string(),
    )
    .unwrap();

    let cfg_path = dir.path().join("skingen.toml");
    std::fs::write(
        &cfg_path,
        format!(
            "backend = \"local\"\nlocal_model_path = {:?}\nmax_length = 300\n",
            weights.display().to_string()
        ),
    )
    .unwrap();

    let cfg = Config::load(Some(&cfg_path)).unwrap();
    assert_eq!(cfg.backend, BackendKind::Local);

    let backend = provider::make_backend(&cfg).unwrap();
    assert_eq!(backend.name(), "local");

    let profile = SkinProfile::new(SkinType::Dry, Goal::Hydration, Some("aloe vera".into()));
    let prompt = backend.prompt_for(&profile);
    let out = backend.generate(&prompt).await.unwrap();
    assert!(out.text.starts_with("Skin Type: Dry\nGoal: Hydration\nIngredients: aloe vera"));
    assert!(out.text.ends_with("Morning Routine: Cleanse"));
}

#[test]
fn malformed_weights_are_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("bad.json");
    std::fs::write(&weights, r#"{"vocab": ["a", "b"], "logits": [[0.0, 0.0]]}"#).unwrap();

    let cfg = Config {
        backend: BackendKind::Local,
        local_model_path: Some(weights),
        ..Config::default()
    };
    let err = provider::make_backend(&cfg).err().unwrap();
    assert!(matches!(err, skingen::SkinGenError::Configuration(_)));
}
