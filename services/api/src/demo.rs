use crate::infra::{seed_demo_pipeline, DemoPipeline};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use talent_pipeline::error::AppError;
use talent_pipeline::recruiting::{
    CandidateService, InMemoryRecruitingStore, PositionCandidateView, PositionService,
    StageUpdateView, StoreError,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the demo position opened (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) opened_on: Option<NaiveDate>,
    /// Print the listing and the stage update as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

/// Output of one demo run.
#[derive(Debug)]
pub(crate) struct DemoOutcome {
    pub(crate) before: Vec<PositionCandidateView>,
    pub(crate) update: StageUpdateView,
    pub(crate) after: Vec<PositionCandidateView>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let opened_on = args
        .opened_on
        .unwrap_or_else(|| Local::now().date_naive());

    let store = Arc::new(InMemoryRecruitingStore::default());
    let demo = seed_demo_pipeline(store.as_ref(), opened_on).await?;
    let outcome = walk_pipeline(store, &demo).await?;

    if args.json {
        let payload = serde_json::json!({
            "before": outcome.before,
            "stageUpdate": outcome.update,
            "after": outcome.after,
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("Demo payload unavailable: {}", err),
        }
        return Ok(());
    }

    println!("Candidate pipeline demo");
    println!(
        "Position {} \"{}\" opened {}",
        demo.position.id, demo.position.title, opened_on
    );
    println!("Stages:");
    for step in &demo.steps {
        println!("  {}. {}", step.order_index, step.name);
    }

    render_listing("\nCandidates", &outcome.before);
    println!(
        "\nMoved {} to {}",
        outcome.update.candidate_name, outcome.update.current_interview_step
    );
    render_listing("\nCandidates after update", &outcome.after);

    Ok(())
}

/// Lists the seeded position, then advances its first candidate to the next stage.
pub(crate) async fn walk_pipeline(
    store: Arc<InMemoryRecruitingStore>,
    demo: &DemoPipeline,
) -> Result<DemoOutcome, AppError> {
    let positions = PositionService::new(Arc::clone(&store));
    let candidates = CandidateService::new(store);

    let before = positions.candidates(demo.position.id).await?;

    let first = demo
        .candidates
        .first()
        .ok_or_else(|| StoreError::BrokenRelation("demo position has no candidates".to_string()))?;
    let candidate = candidates.find(first.id).await?;
    let current = candidate
        .applications
        .iter()
        .find(|application| application.position_id == demo.position.id)
        .map(|application| application.interview_step_id);
    let next = demo
        .steps
        .iter()
        .skip_while(|step| Some(step.id) != current)
        .nth(1)
        .or_else(|| demo.steps.last())
        .ok_or_else(|| StoreError::BrokenRelation("demo position has no stages".to_string()))?;

    let update = candidates
        .update_interview_step(candidate.candidate.id, demo.position.id, next.id)
        .await?;

    let after = positions.candidates(demo.position.id).await?;
    Ok(DemoOutcome {
        before,
        update: update.confirmation(),
        after,
    })
}

fn render_listing(heading: &str, rows: &[PositionCandidateView]) {
    println!("{}", heading);
    for row in rows {
        let average = row
            .average_points
            .map(|points| format!("{:.2}", points))
            .unwrap_or_else(|| "no scores".to_string());
        println!(
            "- {} | {} | average {}",
            row.complete_name, row.current_interview_step, average
        );
    }
}
