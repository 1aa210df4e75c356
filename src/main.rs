use anyhow::Context;
use clap::Parser;
use fs_err as fs;
use std::io;
use std::path::Path;

use skingen::cli::{Args, Command, FormArgs};
use skingen::config::Config;
use skingen::export::ExportedDocument;
use skingen::notify::ReminderNotifier;
use skingen::profile::SkinProfile;
use skingen::render::Assets;
use skingen::{log, provider, ux, SessionUsage, SkinGen, Submission, SubmissionReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log::init_tracing(args.debug);

    let mut cfg = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(b) = args.backend {
        cfg.backend = b;
    }
    if let Some(m) = &args.model {
        cfg.model = m.clone();
    }
    if let Some(d) = &args.out_dir {
        cfg.out_dir = d.clone();
    }
    cfg.resolve_api_key();

    let backend = provider::make_backend(&cfg).context("setting up the text generator")?;
    let mut app = SkinGen::new(backend, ReminderNotifier::new(cfg.webhook_url.clone()))
        .with_progress(args.progress);
    if args.save_transcript {
        app = app.with_transcripts(cfg.out_dir.clone());
    }
    tracing::debug!(backend = app.backend_name(), "ready");

    let assets = Assets::new(&cfg.logo_path, &cfg.illustration_path);
    ux::banner(&assets);

    let mut session = SessionUsage::new();
    match args.command {
        Command::Generate(form) => {
            let report = app.submit(&mut session, &submission_from_args(form)).await;
            present(&report, &assets, &cfg.out_dir);
        }
        Command::Session => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            ux::run_session(&mut app, &mut session, &mut input, |report| {
                present(report, &assets, &cfg.out_dir)
            })
            .await;
        }
    }
    Ok(())
}

fn submission_from_args(form: FormArgs) -> Submission {
    Submission {
        profile: SkinProfile::new(form.skin_type, form.goal, form.ingredients),
        email: form.email,
    }
}

fn present(report: &SubmissionReport, assets: &Assets, out_dir: &Path) {
    ux::show_report(report, assets);
    match &report.export {
        Some(Ok(doc)) => {
            if let Err(e) = save_export(doc, out_dir) {
                ux::warn(&format!("could not save {}: {e:#}", doc.filename));
            }
        }
        Some(Err(e)) => ux::warn(&e.to_string()),
        None => {}
    }
}

fn save_export(doc: &ExportedDocument, out_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&doc.filename);
    fs::write(&path, &doc.bytes)?;
    ux::show_saved_export(&path, doc.bytes.len());
    Ok(())
}
