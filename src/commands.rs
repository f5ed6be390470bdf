//! Command runners wired from `main`.
//!
//! Each runner returns the process exit code it wants; errors that escape
//! are plumbing failures and also exit non-zero.
use crate::cli::{DownloadArgs, FixWorkflowsArgs};
use crate::fetch::{
    self, remediation, FetchError, Fetcher, HttpFetcher, HubFetcher, PlanOutcome,
};
use crate::layout::{env_value, Layout, CIVITAI_TOKEN_ENV, HF_TOKEN_ENV};
use crate::plan::{FetchPlan, Source};
use crate::prompt::confirm_overwrite;
use crate::report;
use crate::workflow;
use anyhow::Result;
use std::io;
use std::process::ExitCode;

pub fn run_download(args: &DownloadArgs) -> Result<ExitCode> {
    let layout = Layout::from_env()?;
    let spec = args.family.spec();
    let plan = FetchPlan::for_family(args.family, &layout);
    tracing::debug!(family = args.family.key(), root = %layout.root().display(), "download plan");

    let token = match spec.source {
        Source::Hub { .. } => env_value(HF_TOKEN_ENV),
        Source::Http { .. } => env_value(CIVITAI_TOKEN_ENV),
    };
    let token_present = token.is_some();

    let result = fetch::prepare_destinations(&plan).and_then(|()| {
        report::print_intro(spec, &layout, &plan);
        if args.dry_run {
            println!("Dry run: nothing was fetched.");
            return Ok(None);
        }
        let fetcher = build_fetcher(&plan.source, token, &layout)?;
        let stdin = io::stdin();
        let mut confirm = |path: &std::path::Path| {
            confirm_overwrite(&mut stdin.lock(), &mut io::stdout(), path)
        };
        fetch::run_plan(&plan, fetcher.as_ref(), &mut confirm).map(Some)
    });

    match result {
        Ok(None) => Ok(ExitCode::SUCCESS),
        Ok(Some(outcome)) => {
            report::print_outcome(spec, &plan, &outcome);
            if let PlanOutcome::Completed(paths) = &outcome {
                tracing::info!(family = args.family.key(), files = paths.len(), "download finished");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::warn!(family = args.family.key(), error = %err, "download failed");
            let hints = remediation::hints(err.kind(), &spec.source, args.family, token_present);
            report::print_failure(&err, &hints);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_fetcher(
    source: &Source,
    token: Option<String>,
    layout: &Layout,
) -> Result<Box<dyn Fetcher>, FetchError> {
    Ok(match source {
        Source::Hub { repo_id } => Box::new(HubFetcher::new(
            repo_id,
            token,
            layout.hub_cache_dir(),
        )?),
        Source::Http { .. } => Box::new(HttpFetcher::from_env(token)?),
    })
}

pub fn run_fix_workflows(args: &FixWorkflowsArgs) -> Result<ExitCode> {
    let layout = Layout::from_env()?;
    let root = layout.workflows_dir();
    if let Some(summary) = workflow::walk(&root, args.pass)? {
        tracing::debug!(
            total = summary.total,
            fixed = summary.fixed,
            failed = summary.failed,
            "workflow walk finished"
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_families() -> Result<ExitCode> {
    let layout = Layout::from_env()?;
    report::print_families(&layout);
    Ok(ExitCode::SUCCESS)
}
