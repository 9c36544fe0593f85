//! When steps for error triage BDD scenarios.

use std::sync::Arc;

use eyre::WrapErr;
use faultline::analysis::{
    domain::{Confidence, Severity},
    ports::{AnalysisRepository, CandidateFilter},
};
use faultline::pipeline::{PipelineOptions, StageSelection};
use faultline::tag::services::{CleanupRequest, TagCleanupService};
use faultline::task::services::MaterializePolicy;
use rstest_bdd_macros::when;

use super::world::{TriageWorld, run_async};

#[when("the triage pipeline runs over local logs")]
fn run_local_pipeline(world: &mut TriageWorld) -> Result<(), eyre::Report> {
    let options = PipelineOptions {
        stages: StageSelection {
            fetch_remote: false,
            ..StageSelection::all()
        },
        ..PipelineOptions::default()
    };
    let pipeline = world.pipeline()?;
    let summary = run_async(pipeline.run(&options)).wrap_err("run triage pipeline")?;
    eyre::ensure!(
        summary.failures.is_empty(),
        "unexpected stage failures: {:?}",
        summary.failures
    );
    Ok(())
}

#[when(r#"the newest pending analysis is approved by "{actor}""#)]
fn approve_newest(world: &mut TriageWorld, actor: String) -> Result<(), eyre::Report> {
    let filter = CandidateFilter {
        min_severity: Severity::Low,
        min_confidence: Confidence::from_percent(0),
        limit: 1,
    };
    let newest = run_async(world.analyses.list_candidates(&filter))
        .wrap_err("list pending analyses")?
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("no pending analysis to approve"))?;
    let pipeline = world.pipeline()?;
    let outcome = run_async(pipeline.materializer().approve(
        newest.id(),
        &actor,
        &MaterializePolicy::default(),
    ))
    .wrap_err("approve analysis")?;
    world.last_outcome = Some(outcome);
    Ok(())
}

#[when("unused tags are cleaned up with confirmation")]
fn confirmed_cleanup(world: &mut TriageWorld) -> Result<(), eyre::Report> {
    let service = TagCleanupService::new(Arc::clone(&world.tags));
    let request = CleanupRequest {
        confirmed: true,
        ..CleanupRequest::default()
    };
    let report = run_async(service.run(&request)).wrap_err("clean up tags")?;
    world.last_cleanup = Some(report);
    Ok(())
}
