use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::Args;

use byline::config::BylineConfig;
use byline::format::OutputFormat;
use byline::gitio::{NoteStore, SystemGit};
use byline::stats::{Report, aggregate};

/// Aggregate authorship statistics over a revision range
///
/// Examples:
///   byline report HEAD~10..HEAD
///   byline report v1.0..v2.0 --format json
///   byline report main
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Revision range to aggregate (anything `git log` accepts)
    #[arg(default_value = "HEAD")]
    pub range: String,

    /// Output format: text or json
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

pub fn run(args: &ReportArgs) -> Result<()> {
    let git = SystemGit::discover().context("locating the git repository")?;
    let config = BylineConfig::load(git.root()).context("loading configuration")?;
    let notes = NoteStore::new(&git, config.notes.namespace.clone());

    let report = aggregate(&git, &notes, &args.range).context("aggregating range")?;

    match OutputFormat::resolve(args.format) {
        OutputFormat::Json => println!("{}", OutputFormat::Json.serialize(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }
    Ok(())
}

fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Authorship for {} ({} commit(s))",
        report.range, report.commit_count
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  total lines  {:>8}", report.summary.total);
    let _ = writeln!(out, "  human        {:>8}", report.summary.human);
    let _ = writeln!(
        out,
        "  ai           {:>8}  ({:.1}%)",
        report.summary.ai, report.summary.ai_percentage
    );

    if !report.by_author.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {:<24} {:<6} {:>8} {:>8} {:>8} {:>7}",
            "AUTHOR", "KIND", "LINES", "VOLUME", "COMMITS", "SHARE"
        );
        for author in &report.by_author {
            let _ = writeln!(
                out,
                "  {:<24} {:<6} {:>8} {:>8} {:>8} {:>6.1}%",
                author.name,
                author.kind.to_string(),
                author.additions,
                author.volume,
                author.commits,
                author.percentage
            );
        }
    }

    if !report.by_file.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {:<40} {:>8} {:>8} {:>8}",
            "FILE", "TOTAL", "AI", "HUMAN"
        );
        for file in &report.by_file {
            let _ = writeln!(
                out,
                "  {:<40} {:>8} {:>8} {:>8}",
                file.path, file.total, file.ai, file.human
            );
        }
    }

    out
}
