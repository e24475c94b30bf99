use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use clap::Args;

use byline::authorship::AuthorPolicy;
use byline::checkpoint::{CheckpointStore, record_checkpoint};
use byline::config::BylineConfig;
use byline::gitio::{GitRunner as _, SystemGit};
use byline::model::AuthorKind;

/// Record an author-tagged checkpoint of the working tree
///
/// Run this while work happens — before and after an AI session, or from
/// editor and agent hooks. Checkpoints accumulate until the next commit,
/// when `byline finalize` reconciles them against the commit's real diff.
///
/// Examples:
///   byline record --author claude --kind ai
///   byline record --meta session=abc123
///   BYLINE_AUTHOR=alice byline record
#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Author identity (defaults to git user.name, then the configured
    /// default author)
    #[arg(long, env = "BYLINE_AUTHOR")]
    pub author: Option<String>,

    /// Author kind: human or ai (classified from the identity when omitted)
    #[arg(long)]
    pub kind: Option<String>,

    /// Attach key=value metadata to the checkpoint (repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
}

pub fn run(args: &RecordArgs) -> Result<()> {
    let git = SystemGit::discover().context("locating the git repository")?;
    let config = BylineConfig::load(git.root()).context("loading configuration")?;
    let policy = config
        .tracking
        .compile()
        .context("compiling tracking policy")?;

    let author = match &args.author {
        Some(author) => author.clone(),
        None => git
            .run(&["config", "user.name"])
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| config.authors.default_author.clone()),
    };
    let kind = match &args.kind {
        Some(kind) => kind
            .parse::<AuthorKind>()
            .map_err(|err| anyhow::anyhow!(err))?,
        None => AuthorPolicy::from_config(&config.authors).classify(&author),
    };
    let metadata = parse_meta(&args.meta)?;

    let git_dir = git.git_dir().context("locating the .git directory")?;
    let store = CheckpointStore::in_git_dir(&git_dir);

    let outcome = record_checkpoint(&git, git.root(), &store, &policy, &author, kind, metadata)
        .context("recording checkpoint")?;

    if outcome.baseline {
        println!(
            "[OK] baseline checkpoint recorded ({} files tracked)",
            outcome.files_tracked
        );
        println!("     Subsequent checkpoints will diff against this state.");
    } else {
        println!(
            "[OK] checkpoint recorded for {author} ({kind}): {} file(s) changed",
            outcome.files_changed
        );
    }
    Ok(())
}

fn parse_meta(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut metadata = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --meta '{pair}': expected KEY=VALUE");
        };
        metadata.insert(key.to_owned(), value.to_owned());
    }
    Ok(metadata)
}
