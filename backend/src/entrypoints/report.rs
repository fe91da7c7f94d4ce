//! Combined report built from five concurrent upstream fetches.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::launches::rocket_names;
use super::model::{
    Company, CompanySummary, Launch, LaunchSummary, Launchpad, LaunchpadSummary, Rocket,
    RocketSummary,
};
use super::{paths, to_output};
use crate::registry::{
    handler_fn, EntrypointDefinition, HandlerContext, HandlerResult, ValidatedInput,
};

pub const FULL_REPORT: &str = "full-report";

pub fn definitions() -> Vec<EntrypointDefinition> {
    vec![EntrypointDefinition::new(
        FULL_REPORT,
        "Latest and next launch, fleet, company and launch sites in one call",
        handler_fn(full_report),
    )
    .with_price(Some(Decimal::new(1, 2)))]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReport {
    pub generated_at: DateTime<Utc>,
    pub latest_launch: LaunchSummary,
    pub next_launch: LaunchSummary,
    pub company: CompanySummary,
    pub fleet: FleetOverview,
    pub launch_sites: SiteOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetOverview {
    pub total: usize,
    pub active: usize,
    pub rockets: Vec<RocketSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOverview {
    pub total: usize,
    pub active: usize,
    pub launchpads: Vec<LaunchpadSummary>,
}

/// The first failing fetch aborts the whole report.
async fn full_report(ctx: HandlerContext, _input: ValidatedInput) -> HandlerResult {
    let (latest, next, rockets, company, pads) = tokio::try_join!(
        ctx.fetch::<Launch>(paths::LAUNCHES_LATEST),
        ctx.fetch::<Launch>(paths::LAUNCHES_NEXT),
        ctx.fetch::<Vec<Rocket>>(paths::ROCKETS),
        ctx.fetch::<Company>(paths::COMPANY),
        ctx.fetch::<Vec<Launchpad>>(paths::LAUNCHPADS),
    )?;

    to_output(&assemble(latest, next, rockets, company, pads, Utc::now()))
}

pub fn assemble(
    latest: Launch,
    next: Launch,
    rockets: Vec<Rocket>,
    company: Company,
    pads: Vec<Launchpad>,
    generated_at: DateTime<Utc>,
) -> FullReport {
    let (latest_launch, next_launch) = {
        let names = rocket_names(&rockets);
        let name_of = |launch: &Launch| {
            launch
                .rocket
                .as_deref()
                .and_then(|id| names.get(id))
                .map(|name| name.to_string())
        };
        let latest_name = name_of(&latest);
        let next_name = name_of(&next);
        (
            LaunchSummary::from_launch(latest, latest_name),
            LaunchSummary::from_launch(next, next_name),
        )
    };

    let rockets: Vec<RocketSummary> = rockets.into_iter().map(RocketSummary::from).collect();
    let launchpads: Vec<LaunchpadSummary> = pads.into_iter().map(LaunchpadSummary::from).collect();

    FullReport {
        generated_at,
        latest_launch,
        next_launch,
        company: CompanySummary::from(company),
        fleet: FleetOverview {
            total: rockets.len(),
            active: rockets.iter().filter(|r| r.active).count(),
            rockets,
        },
        launch_sites: SiteOverview {
            total: launchpads.len(),
            active: launchpads.iter().filter(|p| p.status == "active").count(),
            launchpads,
        },
    }
}
