use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use byline::authorship::AuthorPolicy;
use byline::checkpoint::{CheckpointStore, record_checkpoint};
use byline::config::BylineConfig;
use byline::gitio::SystemGit;

const HOOK_MARKER: &str = "byline finalize";

const HOOK_SCRIPT: &str = "#!/bin/sh\n\
# Installed by `byline init`: reconcile recorded checkpoints into an\n\
# authorship note after every commit.\n\
byline finalize || true\n";

/// Initialize byline in the current repository
///
/// Creates the checkpoint state directory, installs the post-commit hook,
/// and records a baseline checkpoint. Safe to run multiple times.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Skip installing the post-commit hook
    #[arg(long)]
    pub no_hook: bool,
}

pub fn run(args: &InitArgs) -> Result<()> {
    println!("Initializing byline...");
    println!();

    let git = SystemGit::discover().context(
        "not inside a git repository — run `git init` first, then `byline init`",
    )?;
    let git_dir = git.git_dir().context("locating the .git directory")?;

    let state_dir = git_dir.join("byline");
    fs::create_dir_all(&state_dir)
        .with_context(|| format!("creating state directory {}", state_dir.display()))?;
    println!("[OK] state directory at {}", state_dir.display());

    if args.no_hook {
        println!("[..] skipping hook install (--no-hook)");
    } else {
        install_hook(&git_dir)?;
    }

    if git.root().join(byline::config::CONFIG_PATH).exists() {
        println!("[OK] using .byline/config.toml");
    } else {
        println!("[OK] using default configuration (create .byline/config.toml to customize)");
    }

    record_baseline(&git, &state_dir)?;

    println!();
    println!("byline is ready! Next steps:");
    println!("  byline record --author <name>       # checkpoint during a session");
    println!("  git commit                          # the hook writes the authorship note");
    println!("  byline report HEAD~10..HEAD         # aggregate a range");

    Ok(())
}

fn install_hook(git_dir: &Path) -> Result<()> {
    let hooks_dir = git_dir.join("hooks");
    let hook_path = hooks_dir.join("post-commit");

    if hook_path.exists() {
        let existing = fs::read_to_string(&hook_path)
            .with_context(|| format!("reading {}", hook_path.display()))?;
        if existing.contains(HOOK_MARKER) {
            println!("[OK] post-commit hook already installed");
        } else {
            println!("[WARN] a post-commit hook already exists at {}", hook_path.display());
            println!("       Add this line to it yourself:  byline finalize || true");
        }
        return Ok(());
    }

    fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("creating {}", hooks_dir.display()))?;
    fs::write(&hook_path, HOOK_SCRIPT)
        .with_context(|| format!("writing {}", hook_path.display()))?;
    make_executable(&hook_path)?;
    println!("[OK] installed post-commit hook");
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("marking {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn record_baseline(git: &SystemGit, state_dir: &Path) -> Result<()> {
    let store = CheckpointStore::new(state_dir);
    if !store.load_all().context("reading checkpoint store")?.is_empty() {
        println!("[OK] checkpoint store already has entries; leaving it alone");
        return Ok(());
    }

    let config = BylineConfig::load(git.root()).context("loading configuration")?;
    let policy = config
        .tracking
        .compile()
        .context("compiling tracking policy")?;
    let author = config.authors.default_author.clone();
    let kind = AuthorPolicy::from_config(&config.authors).classify(&author);

    let mut metadata = std::collections::BTreeMap::new();
    metadata.insert("baseline".to_owned(), "init".to_owned());

    let outcome = record_checkpoint(git, git.root(), &store, &policy, &author, kind, metadata)
        .context("recording baseline checkpoint")?;
    println!(
        "[OK] baseline checkpoint recorded ({} files tracked)",
        outcome.files_tracked
    );
    Ok(())
}
