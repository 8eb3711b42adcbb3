use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// How to read the `http_req_failed` outcome metric. The wire format does not
/// say which convention a deployment uses, so it is never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutcomeArg {
    /// `value` is the fraction of requests that failed; `fails` is the
    /// failed-request count
    FractionFailed,
    /// `value` is the fraction of requests that passed; `passes` is the
    /// failed-request count
    FractionPassed,
}

#[derive(Debug, Parser)]
#[command(
    name = "k6check",
    author,
    version,
    about = "Turn k6 load-test results into a GitHub check run report",
    long_about = "k6check aggregates the output of a k6 load test (the --summary-export JSON document and, optionally, the --out json results log) into a markdown report and publishes it as a GitHub check run.",
    after_help = "Examples:\n  k6check render --summary summary.json\n  k6check render --summary summary.json --points results.json\n  k6check publish --summary summary.json --points results.json --base-url https://staging.example.com --repo acme/web --sha $GITHUB_SHA"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the report to stdout without publishing
    Render(RenderArgs),

    /// Render the report and publish it as a GitHub check run
    Publish(PublishArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Path to the k6 end-of-test summary (--summary-export)
    #[arg(long)]
    pub summary: PathBuf,

    /// Path to the k6 JSON results log (--out json); enables the per-status
    /// URL breakdown
    #[arg(long)]
    pub points: Option<PathBuf>,

    /// How to read the http_req_failed metric
    #[arg(long, value_enum, default_value_t = OutcomeArg::FractionFailed)]
    pub outcome: OutcomeArg,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct PublishArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Base URL the test ran against; becomes the check run title
    #[arg(long)]
    pub base_url: String,

    /// Display name of the check run
    #[arg(long, default_value = "Load Test Report")]
    pub name: String,

    /// Repository in OWNER/REPO form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Commit SHA the check run attaches to
    #[arg(long, env = "GITHUB_SHA")]
    pub sha: String,

    /// GitHub token with checks:write permission
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// GitHub API base url (override for GitHub Enterprise)
    #[arg(long, default_value = k6check_github::DEFAULT_API_URL)]
    pub api_url: String,
}
