use anyhow::{Context, Result};
use clap::Args;

use byline::authorship::{FinalizeContext, FinalizeOutcome, finalize_commit};
use byline::checkpoint::CheckpointStore;
use byline::config::BylineConfig;
use byline::gitio::{NoteStore, SystemGit};

/// Reconcile recorded checkpoints into the commit's authorship note
///
/// Runs from the post-commit hook installed by `byline init`, or manually
/// after committing. Pending checkpoints are consumed and a fresh baseline
/// is recorded for the next cycle.
#[derive(Args, Debug)]
pub struct FinalizeArgs {
    /// Commit to finalize
    #[arg(default_value = "HEAD")]
    pub commit: String,
}

pub fn run(args: &FinalizeArgs) -> Result<()> {
    let git = SystemGit::discover().context("locating the git repository")?;
    let config = BylineConfig::load(git.root()).context("loading configuration")?;
    let policy = config
        .tracking
        .compile()
        .context("compiling tracking policy")?;

    let git_dir = git.git_dir().context("locating the .git directory")?;
    let store = CheckpointStore::in_git_dir(&git_dir);
    let notes = NoteStore::new(&git, config.notes.namespace.clone());

    let ctx = FinalizeContext {
        git: &git,
        worktree: git.root(),
        store: &store,
        notes: &notes,
        policy: &policy,
        default_author: &config.authors.default_author,
        default_kind: config.authors.default_kind,
    };

    match finalize_commit(&ctx, &args.commit).context("finalizing commit")? {
        FinalizeOutcome::Persisted {
            commit,
            files,
            authors,
        } => {
            println!(
                "[OK] authorship note written for {} ({files} file(s), {authors} author(s))",
                short(&commit)
            );
        }
        FinalizeOutcome::NothingToAttribute { commit } => {
            println!(
                "[OK] commit {} touched no tracked files; nothing to attribute",
                short(&commit)
            );
        }
    }
    Ok(())
}

fn short(commit: &str) -> &str {
    &commit[..commit.len().min(8)]
}
