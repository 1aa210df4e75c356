use colored::Colorize;
use humansize::{format_size, DECIMAL};
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::flow::{Generation, SkinGen, Submission, SubmissionReport};
use crate::notify::ReminderOutcome;
use crate::profile::{Goal, SkinProfile, SkinType};
use crate::render::{self, Assets};
use crate::session::{SessionUsage, FREE_TIER_LIMIT, UPGRADE_URL};

pub fn banner(assets: &Assets) {
    match assets.logo() {
        Ok(p) => println!("{}", format!("[logo: {}]", p.display()).dimmed()),
        Err(e) => warn(&e.to_string()),
    }
    println!("{}", "SkinGen AI".bold());
    println!("{}\n", "Your personalized DIY skincare planner".italic());
}

pub fn heading(text: &str) {
    println!("\n{}", format!("=== {text} ===").bold());
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "ok:".green().bold(), msg);
}

pub fn inline_error(msg: &str) {
    println!("{} {}", "error:".red().bold(), msg);
}

pub fn show_limit_notice(upgrade_url: &str) {
    warn(&format!(
        "You've reached your limit of {FREE_TIER_LIMIT} free routine. Upgrade to Pro for unlimited access!"
    ));
    println!("Upgrade to Pro: {}", upgrade_url.underline());
}

pub fn show_report(report: &SubmissionReport, assets: &Assets) {
    match &report.generation {
        Generation::LimitReached { upgrade_url } => {
            show_limit_notice(upgrade_url);
            return;
        }
        Generation::Failed(e) => {
            inline_error(&e.to_string());
            return;
        }
        Generation::Routine(routine) => {
            heading("Your Personalized Routine");
            println!("{}", render::render_routine(routine));
        }
    }

    match assets.illustration() {
        Ok(p) => println!("\n{}", format!("[illustration: {}]", p.display()).dimmed()),
        Err(e) => warn(&e.to_string()),
    }
    if let Some(url) = report.video {
        println!("Watch: {}", url.underline());
    }

    match &report.reminder {
        ReminderOutcome::Skipped => {}
        ReminderOutcome::Registered => success("You'll receive your daily routine via email!"),
        ReminderOutcome::Failed(e) => warn(&e.to_string()),
    }
}

pub fn show_saved_export(path: &Path, bytes: usize) {
    heading("Download Your Routine");
    println!("{} ({})", path.display(), format_size(bytes, DECIMAL));
}

/// Interactive form loop for one session. Once the free routine is used the
/// upgrade notice replaces the form and the loop ends. Also stops on EOF or
/// when the user declines another round. Returns the number of submissions.
pub async fn run_session<R: BufRead>(
    app: &mut SkinGen,
    session: &mut SessionUsage,
    input: &mut R,
    mut present: impl FnMut(&SubmissionReport),
) -> usize {
    let mut submitted = 0;
    loop {
        if session.limit_reached() {
            show_limit_notice(UPGRADE_URL);
            break;
        }
        heading("Tell us about your skin");
        let Some(sub) = read_form(input) else { break };
        let report = app.submit(session, &sub).await;
        submitted += 1;
        present(&report);
        if !read_confirm(input, "Generate another routine?") {
            break;
        }
    }
    submitted
}

pub fn read_form<R: BufRead>(input: &mut R) -> Option<Submission> {
    let skin_type = read_select(input, "Skin Type", &SkinType::ALL)?;
    let goal = read_select(input, "Skincare Goal", &Goal::ALL)?;
    let ingredients = read_text(input, "Home Ingredients (optional, e.g. honey, turmeric, aloe vera):")?;
    let email = read_text(input, "Want daily reminders? Enter your email (optional):")?;
    Some(Submission {
        profile: SkinProfile::new(skin_type, goal, Some(ingredients)),
        email: Some(email),
    })
}

/// Pick one of `options` by number; re-asks until valid. `None` on EOF.
pub fn read_select<T: Display + Copy, R: BufRead>(input: &mut R, label: &str, options: &[T]) -> Option<T> {
    loop {
        println!("{}", label.bold());
        for (i, o) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, o);
        }
        print!("> ");
        let _ = io::stdout().flush();
        let line = read_line(input)?;
        match line.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Some(options[n - 1]),
            _ => warn(&format!("enter a number between 1 and {}", options.len())),
        }
    }
}

/// Free text; empty input is allowed. `None` on EOF.
pub fn read_text<R: BufRead>(input: &mut R, label: &str) -> Option<String> {
    print!("{} ", label.bold());
    let _ = io::stdout().flush();
    read_line(input)
}

pub fn read_confirm<R: BufRead>(input: &mut R, prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    match read_line(input) {
        Some(ans) => {
            let ans = ans.to_lowercase();
            ans == "y" || ans == "yes"
        }
        None => false,
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Option<String> {
    let mut s = String::new();
    match input.read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn select_retries_until_valid() {
        let mut input = Cursor::new("9\nabc\n3\n");
        assert_eq!(read_select(&mut input, "Skincare Goal", &Goal::ALL), Some(Goal::AntiAging));
    }

    #[test]
    fn select_gives_up_on_eof() {
        let mut input = Cursor::new("");
        assert_eq!(read_select(&mut input, "Skincare Goal", &Goal::ALL), None);
    }

    #[test]
    fn form_reads_all_fields() {
        let mut input = Cursor::new("1\n4\naloe vera\n\n");
        let sub = read_form(&mut input).unwrap();
        assert_eq!(sub.profile.skin_type, SkinType::Dry);
        assert_eq!(sub.profile.goal, Goal::Hydration);
        assert_eq!(sub.profile.ingredients.as_deref(), Some("aloe vera"));
        assert_eq!(sub.email.as_deref(), Some(""));
    }

    #[test]
    fn text_and_confirm() {
        let mut input = Cursor::new("  honey, turmeric \nYes\n");
        assert_eq!(read_text(&mut input, "Ingredients").as_deref(), Some("honey, turmeric"));
        assert!(read_confirm(&mut input, "Again?"));
        assert!(!read_confirm(&mut input, "Again?"));
    }
}
