use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::profile::{Goal, SkinType};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted chat-completion endpoint.
    #[value(alias = "openai")]
    Remote,
    /// In-process decoder loaded from `local_model_path`.
    Local,
}

#[derive(Parser, Debug)]
#[command(name = "skingen", version, about = "Your personalized DIY skincare planner")]
pub struct Args {
    /// TOML config file; flags below override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendKind>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true)]
    pub out_dir: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, global = true)]
    pub progress: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub save_transcript: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one routine from flags.
    Generate(FormArgs),
    /// Fill the form interactively; the session ends on exit.
    Session,
}

#[derive(clap::Args, Debug, Clone)]
pub struct FormArgs {
    #[arg(long, value_enum)]
    pub skin_type: SkinType,

    #[arg(long, value_enum)]
    pub goal: Goal,

    /// e.g. "honey, turmeric, aloe vera"
    #[arg(long)]
    pub ingredients: Option<String>,

    /// Register for email reminders.
    #[arg(long)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_form() {
        let args = Args::try_parse_from([
            "skingen", "--backend", "local", "generate",
            "--skin-type", "dry", "--goal", "hydration",
            "--ingredients", "aloe vera",
        ])
        .unwrap();
        assert_eq!(args.backend, Some(BackendKind::Local));
        match args.command {
            Command::Generate(form) => {
                assert_eq!(form.skin_type, SkinType::Dry);
                assert_eq!(form.goal, Goal::Hydration);
                assert_eq!(form.ingredients.as_deref(), Some("aloe vera"));
                assert!(form.email.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn progress_can_be_disabled() {
        let args = Args::try_parse_from(["skingen", "session", "--progress", "false"]).unwrap();
        assert!(!args.progress);
        assert!(matches!(args.command, Command::Session));
    }
}
