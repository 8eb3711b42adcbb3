use k6check_github::{CheckConclusion, CheckOutput, CheckRun, ChecksClient, ChecksConfig};
use k6check_metrics::{Point, Summary};

use crate::cli::{InputArgs, OutcomeArg, PublishArgs, RenderArgs};
use crate::input;
use crate::report::{self, OutcomeConvention};
use crate::run_error::RunError;

pub(crate) async fn render(args: RenderArgs) -> Result<(), RunError> {
    let (summary, points) = load_inputs(&args.input).await?;

    print!("{}", report::render_summary(&summary));
    println!();
    print!(
        "{}",
        report::render_report(&summary, points.as_deref(), convention(args.input.outcome))
    );

    Ok(())
}

pub(crate) async fn publish(args: PublishArgs) -> Result<(), RunError> {
    let (summary, points) = load_inputs(&args.input).await?;

    let short = report::render_summary(&summary);
    let body = report::render_report(&summary, points.as_deref(), convention(args.input.outcome));

    let (owner, repo) = split_repo(&args.repo)?;
    let mut config = ChecksConfig::new(owner, repo, args.token);
    config.api_url = args.api_url;

    let check = CheckRun {
        name: args.name,
        head_sha: args.sha,
        conclusion: CheckConclusion::Success,
        output: CheckOutput {
            title: args.base_url,
            summary: short,
            text: body,
        },
    };

    let url = ChecksClient::new(config)
        .create_check_run(&check)
        .await
        .map_err(|err| {
            RunError::PublishFailed(anyhow::Error::new(err).context("failed to create check run"))
        })?;

    println!("check_run={url}");

    Ok(())
}

async fn load_inputs(args: &InputArgs) -> Result<(Summary, Option<Vec<Point>>), RunError> {
    let summary = input::read_summary(&args.summary).await?;

    for key in &summary.invalid_status_keys {
        eprintln!("ignoring unparsable status metric key: {key}");
    }

    let points = match &args.points {
        Some(path) => Some(input::read_points(path).await?),
        None => None,
    };

    Ok((summary, points))
}

fn convention(arg: OutcomeArg) -> OutcomeConvention {
    match arg {
        OutcomeArg::FractionFailed => OutcomeConvention::FractionFailed,
        OutcomeArg::FractionPassed => OutcomeConvention::FractionPassed,
    }
}

fn split_repo(repo: &str) -> Result<(String, String), RunError> {
    let invalid = || {
        RunError::InvalidInput(anyhow::anyhow!(
            "invalid --repo (expected OWNER/REPO): {repo}"
        ))
    };

    let (owner, name) = repo.split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(invalid());
    }

    Ok((owner.to_string(), name.to_string()))
}
