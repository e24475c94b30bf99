use anyhow::Result;
use clap::{Parser, Subcommand};

mod doctor;
mod finalize;
mod init;
mod record;
mod report;

/// Line-level human/AI authorship attribution for git
///
/// byline watches work happen through author-tagged checkpoints, reconciles
/// them against each commit's real diff, and attaches a per-commit
/// authorship note under refs/notes/byline. Aggregate any revision range to
/// see who — or what — wrote the code.
///
/// QUICK START:
///
///   byline init                                # install the post-commit hook
///   byline record --author claude --kind ai    # checkpoint during a session
///   git commit -m "feat: ..."                  # hook writes the authorship note
///   byline report HEAD~10..HEAD                # aggregate a range
#[derive(Parser)]
#[command(name = "byline")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'byline <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an author-tagged checkpoint of the working tree
    Record(record::RecordArgs),

    /// Reconcile checkpoints into a commit's authorship note
    Finalize(finalize::FinalizeArgs),

    /// Aggregate authorship statistics over a revision range
    Report(report::ReportArgs),

    /// Initialize byline in the current repository
    Init(init::InitArgs),

    /// Check system requirements and configuration
    Doctor(doctor::DoctorArgs),
}

fn main() -> Result<()> {
    byline::telemetry::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Record(args) => record::run(&args),
        Commands::Finalize(args) => finalize::run(&args),
        Commands::Report(args) => report::run(&args),
        Commands::Init(args) => init::run(&args),
        Commands::Doctor(args) => doctor::run(&args),
    }
}
