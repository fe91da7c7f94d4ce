//! Launch entrypoints: latest, next, upcoming and past launches.

use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

use super::model::{Launch, LaunchSummary, Rocket};
use super::{paths, to_output};
use crate::registry::{
    handler_fn, EntrypointDefinition, FieldSpec, HandlerContext, HandlerResult, InputContract,
    ValidatedInput,
};

pub const LATEST_LAUNCH: &str = "latest-launch";
pub const NEXT_LAUNCH: &str = "next-launch";
pub const UPCOMING_LAUNCHES: &str = "upcoming-launches";
pub const PAST_LAUNCHES: &str = "past-launches";

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

pub fn definitions() -> Vec<EntrypointDefinition> {
    vec![
        EntrypointDefinition::new(
            LATEST_LAUNCH,
            "Most recent SpaceX launch",
            handler_fn(latest_launch),
        )
        .with_price(Some(Decimal::new(1, 3))),
        EntrypointDefinition::new(
            NEXT_LAUNCH,
            "Next scheduled SpaceX launch",
            handler_fn(next_launch),
        )
        .with_price(Some(Decimal::new(1, 3))),
        EntrypointDefinition::new(
            UPCOMING_LAUNCHES,
            "Upcoming launches, optionally filtered by rocket",
            handler_fn(upcoming_launches),
        )
        .with_contract(
            InputContract::empty()
                .field(limit_field())
                .field(
                    FieldSpec::text("rocketType", "Rocket name filter, e.g. \"falcon 9\"")
                        .max_len(64)
                        .optional(),
                ),
        )
        .with_price(Some(Decimal::new(2, 3))),
        EntrypointDefinition::new(
            PAST_LAUNCHES,
            "Past launches, most recent first",
            handler_fn(past_launches),
        )
        .with_contract(
            InputContract::empty().field(limit_field()).field(
                FieldSpec::boolean("successOnly", "Only successful launches").with_default(false),
            ),
        )
        .with_price(Some(Decimal::new(2, 3))),
    ]
}

fn limit_field() -> FieldSpec {
    FieldSpec::integer("limit", "Maximum launches to return", 1, MAX_LIMIT)
        .with_default(DEFAULT_LIMIT)
}

/// Upcoming launches after rocket filtering and truncation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingLaunches {
    /// Upcoming launches reported upstream
    pub total: usize,
    /// Launches matching the rocket filter
    pub filtered: usize,
    pub returned: usize,
    pub rocket_type: Option<String>,
    pub launches: Vec<LaunchSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PastLaunches {
    pub total: usize,
    pub filtered: usize,
    pub returned: usize,
    pub success_only: bool,
    pub launches: Vec<LaunchSummary>,
}

async fn latest_launch(ctx: HandlerContext, _input: ValidatedInput) -> HandlerResult {
    let launch: Launch = ctx.fetch(paths::LAUNCHES_LATEST).await?;
    to_output(&LaunchSummary::from_launch(launch, None))
}

async fn next_launch(ctx: HandlerContext, _input: ValidatedInput) -> HandlerResult {
    let launch: Launch = ctx.fetch(paths::LAUNCHES_NEXT).await?;
    to_output(&LaunchSummary::from_launch(launch, None))
}

async fn upcoming_launches(ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
    let limit = input.size("limit").unwrap_or(DEFAULT_LIMIT as usize);
    let rocket_type = input.text("rocketType").map(str::to_string);

    let (launches, rockets) = tokio::try_join!(
        ctx.fetch::<Vec<Launch>>(paths::LAUNCHES_UPCOMING),
        ctx.fetch::<Vec<Rocket>>(paths::ROCKETS),
    )?;

    to_output(&filter_upcoming(launches, &rockets, rocket_type, limit))
}

async fn past_launches(ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
    let limit = input.size("limit").unwrap_or(DEFAULT_LIMIT as usize);
    let success_only = input.boolean("successOnly").unwrap_or(false);

    let launches: Vec<Launch> = ctx.fetch(paths::LAUNCHES_PAST).await?;
    to_output(&select_past(launches, success_only, limit))
}

/// Keep launches whose rocket name matches `rocket_type`, in upstream order,
/// then take the first `limit`.
pub fn filter_upcoming(
    launches: Vec<Launch>,
    rockets: &[Rocket],
    rocket_type: Option<String>,
    limit: usize,
) -> UpcomingLaunches {
    let names = rocket_names(rockets);
    let needle = rocket_type.as_deref().map(normalize_name);
    let total = launches.len();

    let matching: Vec<LaunchSummary> = launches
        .into_iter()
        .filter_map(|launch| {
            let rocket_name = launch
                .rocket
                .as_deref()
                .and_then(|id| names.get(id))
                .map(|name| name.to_string());
            let keep = match (&needle, &rocket_name) {
                (None, _) => true,
                (Some(needle), Some(name)) => normalize_name(name).contains(needle.as_str()),
                (Some(_), None) => false,
            };
            keep.then(|| LaunchSummary::from_launch(launch, rocket_name))
        })
        .collect();

    let filtered = matching.len();
    let launches: Vec<LaunchSummary> = matching.into_iter().take(limit).collect();

    UpcomingLaunches {
        total,
        filtered,
        returned: launches.len(),
        rocket_type,
        launches,
    }
}

pub fn select_past(launches: Vec<Launch>, success_only: bool, limit: usize) -> PastLaunches {
    let total = launches.len();
    let mut matching: Vec<Launch> = launches
        .into_iter()
        .filter(|launch| !success_only || launch.success == Some(true))
        .collect();
    // Undated launches sort last.
    matching.sort_by_key(|launch| Reverse(launch.date_unix));

    let filtered = matching.len();
    let launches: Vec<LaunchSummary> = matching
        .into_iter()
        .take(limit)
        .map(|launch| LaunchSummary::from_launch(launch, None))
        .collect();

    PastLaunches {
        total,
        filtered,
        returned: launches.len(),
        success_only,
        launches,
    }
}

pub(crate) fn rocket_names(rockets: &[Rocket]) -> HashMap<&str, &str> {
    rockets
        .iter()
        .map(|rocket| (rocket.id.as_str(), rocket.name.as_str()))
        .collect()
}

/// Lowercase alphanumerics only, so "Falcon 9", "falcon9" and "FALCON-9" compare equal.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
