use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::{Result, SkinGenError};
use crate::export::{self, ExportedDocument};
use crate::log::{self, GenerationRequest, GenerationResponse};
use crate::notify::{ReminderNotifier, ReminderOutcome};
use crate::profile::{RoutineResult, SkinProfile};
use crate::provider::DynBackend;
use crate::render;
use crate::session::{SessionUsage, UPGRADE_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Generating,
    Rendered,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub profile: SkinProfile,
    pub email: Option<String>,
}

#[derive(Debug)]
pub enum Generation {
    Routine(RoutineResult),
    /// Free-tier limit hit; the backend was not called.
    LimitReached { upgrade_url: &'static str },
    Failed(SkinGenError),
}

/// Everything shown for one submission. Exactly one of routine, limit notice
/// or inline error is carried in `generation`; export and reminder never
/// replace it.
#[derive(Debug)]
pub struct SubmissionReport {
    pub id: Uuid,
    pub generation: Generation,
    pub export: Option<Result<ExportedDocument>>,
    pub reminder: ReminderOutcome,
    pub video: Option<&'static str>,
}

impl SubmissionReport {
    pub fn routine(&self) -> Option<&RoutineResult> {
        match &self.generation {
            Generation::Routine(r) => Some(r),
            _ => None,
        }
    }
}

/// Turns a rendered routine into a downloadable document.
pub type Exporter = fn(&SkinProfile, &RoutineResult) -> Result<ExportedDocument>;

pub struct SkinGen {
    backend: DynBackend,
    notifier: ReminderNotifier,
    exporter: Exporter,
    progress: bool,
    transcripts: Option<PathBuf>,
    state: FlowState,
}

impl SkinGen {
    pub fn new(backend: DynBackend, notifier: ReminderNotifier) -> Self {
        Self {
            backend,
            notifier,
            exporter: export::export_pdf,
            progress: false,
            transcripts: None,
            state: FlowState::Idle,
        }
    }

    /// Replace the PDF exporter.
    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// Show a spinner while the backend call is in flight.
    pub fn with_progress(mut self, on: bool) -> Self {
        self.progress = on;
        self
    }

    /// Archive each generation under `root/.skingen/tx/`.
    pub fn with_transcripts(mut self, root: impl Into<PathBuf>) -> Self {
        self.transcripts = Some(root.into());
        self
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn submit(&mut self, session: &mut SessionUsage, sub: &Submission) -> SubmissionReport {
        let id = Uuid::new_v4();
        self.state = FlowState::Idle;

        if session.limit_reached() {
            tracing::info!(count = session.count(), "free-tier limit reached; generation refused");
            return SubmissionReport {
                id,
                generation: Generation::LimitReached { upgrade_url: UPGRADE_URL },
                export: None,
                reminder: ReminderOutcome::Skipped,
                video: None,
            };
        }

        let prompt = self.backend.prompt_for(&sub.profile);
        self.state = FlowState::Generating;
        let spinner = self.spinner();
        tracing::info!(backend = self.backend.name(), skin_type = %sub.profile.skin_type, goal = %sub.profile.goal, "generating routine");
        let result = self.backend.generate(&prompt).await;
        spinner.finish_and_clear();
        self.state = FlowState::Rendered;

        self.archive(id, &sub.profile, &prompt, &result);

        let routine = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                return SubmissionReport {
                    id,
                    generation: Generation::Failed(e),
                    export: None,
                    reminder: ReminderOutcome::Skipped,
                    video: None,
                };
            }
        };
        session.increment();

        let export = (self.exporter)(&sub.profile, &routine);
        if let Err(e) = &export {
            tracing::warn!(error = %e, "routine export failed");
        }
        let reminder = self.notifier.notify(sub.email.as_deref(), &routine).await;

        SubmissionReport {
            id,
            video: render::video_for_optional(Some(sub.profile.goal)),
            generation: Generation::Routine(routine),
            export: Some(export),
            reminder,
        }
    }

    fn spinner(&self) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Creating your custom skincare routine...");
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    fn archive(&self, id: Uuid, profile: &SkinProfile, prompt: &str, result: &Result<RoutineResult>) {
        let Some(root) = &self.transcripts else { return };
        let req = GenerationRequest {
            id,
            timestamp: Utc::now(),
            backend: self.backend.name(),
            profile,
            prompt,
        };
        let resp = GenerationResponse {
            id,
            timestamp: Utc::now(),
            routine: result.as_ref().ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        };
        match log::save_transcript(root, &req, &resp) {
            Ok(saved) => tracing::debug!(dir = %saved.dir.display(), "saved transcript"),
            Err(e) => tracing::warn!(error = %e, "could not save transcript"),
        }
    }
}
