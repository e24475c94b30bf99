use std::process::Command;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use byline::config::BylineConfig;
use byline::format::OutputFormat;
use byline::gitio::{GitRunner as _, SystemGit};

#[derive(Serialize)]
struct DoctorEnvelope {
    checks: Vec<DoctorCheck>,
    all_ok: bool,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<String>,
}

impl DoctorCheck {
    fn ok(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            status: "ok".to_owned(),
            message: message.into(),
            fix: None,
        }
    }

    fn warn(name: &str, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            status: "warn".to_owned(),
            message: message.into(),
            fix: Some(fix.into()),
        }
    }

    fn fail(name: &str, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            status: "fail".to_owned(),
            message: message.into(),
            fix: Some(fix.into()),
        }
    }
}

fn print_check(check: &DoctorCheck) {
    let prefix = match check.status.as_str() {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "fail" => "[FAIL]",
        _ => "[???]",
    };
    println!("{} {}", prefix, check.message);
    if let Some(fix) = &check.fix {
        println!("       {fix}");
    }
}

/// Check system requirements and configuration
#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output format: text or json
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

pub fn run(args: &DoctorArgs) -> Result<()> {
    let mut checks = Vec::new();

    checks.push(check_git_binary());

    let repo = SystemGit::discover().ok();
    checks.push(check_repository(repo.as_ref()));

    if let Some(git) = &repo {
        checks.push(check_state_dir(git));
        checks.push(check_hook(git));
        checks.push(check_config(git));
        checks.push(check_notes(git));
    }

    let all_ok = checks.iter().all(|c| c.status == "ok");

    match OutputFormat::resolve(args.format) {
        OutputFormat::Json => {
            let envelope = DoctorEnvelope { checks, all_ok };
            println!("{}", OutputFormat::Json.serialize(&envelope)?);
        }
        OutputFormat::Text => {
            for check in &checks {
                print_check(check);
            }
            println!();
            if all_ok {
                println!("All checks passed.");
            } else {
                println!("Some checks need attention (see above).");
            }
        }
    }

    Ok(())
}

fn check_git_binary() -> DoctorCheck {
    match Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_owned();
            DoctorCheck::ok("git", version)
        }
        _ => DoctorCheck::fail(
            "git",
            "git is not installed or not on PATH",
            "Install git: https://git-scm.com/downloads",
        ),
    }
}

fn check_repository(repo: Option<&SystemGit>) -> DoctorCheck {
    match repo {
        Some(git) => DoctorCheck::ok(
            "repository",
            format!("git repository at {}", git.root().display()),
        ),
        None => DoctorCheck::fail(
            "repository",
            "not inside a git repository",
            "Run from a repository, or `git init` one first.",
        ),
    }
}

fn check_state_dir(git: &SystemGit) -> DoctorCheck {
    match git.git_dir() {
        Ok(git_dir) => {
            let state_dir = git_dir.join("byline");
            if state_dir.is_dir() {
                DoctorCheck::ok("state", format!("state directory at {}", state_dir.display()))
            } else {
                DoctorCheck::warn(
                    "state",
                    "state directory not created yet",
                    "Run: byline init",
                )
            }
        }
        Err(err) => DoctorCheck::fail("state", format!("cannot locate .git: {err}"), "Check repository health with `git status`."),
    }
}

fn check_hook(git: &SystemGit) -> DoctorCheck {
    let Ok(git_dir) = git.git_dir() else {
        return DoctorCheck::warn("hook", "cannot locate hooks directory", "Run: byline init");
    };
    let hook = git_dir.join("hooks").join("post-commit");
    match std::fs::read_to_string(&hook) {
        Ok(content) if content.contains("byline finalize") => {
            DoctorCheck::ok("hook", "post-commit hook installed")
        }
        Ok(_) => DoctorCheck::warn(
            "hook",
            "post-commit hook exists but does not run byline",
            "Add to it:  byline finalize || true",
        ),
        Err(_) => DoctorCheck::warn(
            "hook",
            "post-commit hook not installed — notes must be written manually",
            "Run: byline init   (or run `byline finalize` after each commit)",
        ),
    }
}

fn check_config(git: &SystemGit) -> DoctorCheck {
    match BylineConfig::load(git.root()) {
        Ok(_) => {
            if git.root().join(byline::config::CONFIG_PATH).exists() {
                DoctorCheck::ok("config", "configuration loads cleanly")
            } else {
                DoctorCheck::ok("config", "no config file; defaults in effect")
            }
        }
        Err(err) => DoctorCheck::fail(
            "config",
            format!("configuration is broken: {err}"),
            "Fix or remove .byline/config.toml.",
        ),
    }
}

fn check_notes(git: &SystemGit) -> DoctorCheck {
    let namespace = BylineConfig::load(git.root())
        .map(|c| c.notes.namespace)
        .unwrap_or_else(|_| "byline".to_owned());
    match git.run(&["notes", "--ref", &namespace, "list"]) {
        Ok(listing) => {
            let count = listing.lines().filter(|l| !l.trim().is_empty()).count();
            if count == 0 {
                DoctorCheck::ok("notes", "no authorship notes yet")
            } else {
                DoctorCheck::ok("notes", format!("{count} authorship note(s) recorded"))
            }
        }
        // The notes ref does not exist until the first note is written.
        Err(_) => DoctorCheck::ok("notes", "no authorship notes yet"),
    }
}
