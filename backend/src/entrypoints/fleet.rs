//! Hardware entrypoints: rockets, launchpads and the Starlink constellation.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::model::{Launchpad, LaunchpadSummary, Rocket, RocketSummary, StarlinkSatellite};
use super::{paths, to_output};
use crate::registry::{
    handler_fn, EntrypointDefinition, FieldSpec, HandlerContext, HandlerResult, InputContract,
    ValidatedInput,
};

pub const ROCKETS: &str = "rockets";
pub const LAUNCHPADS: &str = "launchpads";
pub const STARLINK_STATS: &str = "starlink-stats";

/// Launchpad statuses used by the upstream API.
pub const LAUNCHPAD_STATUSES: [&str; 5] =
    ["active", "inactive", "retired", "under construction", "unknown"];

pub fn definitions() -> Vec<EntrypointDefinition> {
    vec![
        EntrypointDefinition::new(ROCKETS, "SpaceX rocket fleet", handler_fn(rockets))
            .with_contract(InputContract::empty().field(
                FieldSpec::boolean("activeOnly", "Only rockets still in service").with_default(false),
            ))
            .with_price(Some(Decimal::new(1, 3))),
        EntrypointDefinition::new(
            LAUNCHPADS,
            "Launch sites with success rates",
            handler_fn(launchpads),
        )
        .with_contract(
            InputContract::empty().field(
                FieldSpec::text("status", "Only pads with this status")
                    .one_of(&LAUNCHPAD_STATUSES)
                    .optional(),
            ),
        )
        .with_price(Some(Decimal::new(1, 3))),
        EntrypointDefinition::new(
            STARLINK_STATS,
            "Starlink constellation statistics",
            handler_fn(starlink_stats),
        )
        .with_price(Some(Decimal::new(3, 3))),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RocketList {
    pub total: usize,
    pub returned: usize,
    pub active_only: bool,
    pub rockets: Vec<RocketSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadList {
    pub total: usize,
    pub returned: usize,
    pub status: Option<String>,
    pub launchpads: Vec<LaunchpadSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarlinkStats {
    pub total: usize,
    pub in_orbit: usize,
    pub decayed: usize,
    /// Satellite count per hardware version (`unknown` when unreported)
    pub by_version: BTreeMap<String, usize>,
    /// Mean altitude of in-orbit satellites reporting one, in km
    pub average_height_km: Option<f64>,
}

async fn rockets(ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
    let active_only = input.boolean("activeOnly").unwrap_or(false);
    let rockets: Vec<Rocket> = ctx.fetch(paths::ROCKETS).await?;
    to_output(&list_rockets(rockets, active_only))
}

async fn launchpads(ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
    let status = input.text("status").map(str::to_string);
    let pads: Vec<Launchpad> = ctx.fetch(paths::LAUNCHPADS).await?;
    to_output(&list_launchpads(pads, status))
}

async fn starlink_stats(ctx: HandlerContext, _input: ValidatedInput) -> HandlerResult {
    let satellites: Vec<StarlinkSatellite> = ctx.fetch(paths::STARLINK).await?;
    to_output(&starlink_summary(&satellites))
}

pub fn list_rockets(rockets: Vec<Rocket>, active_only: bool) -> RocketList {
    let total = rockets.len();
    let rockets: Vec<RocketSummary> = rockets
        .into_iter()
        .filter(|rocket| !active_only || rocket.active)
        .map(RocketSummary::from)
        .collect();

    RocketList {
        total,
        returned: rockets.len(),
        active_only,
        rockets,
    }
}

pub fn list_launchpads(pads: Vec<Launchpad>, status: Option<String>) -> LaunchpadList {
    let total = pads.len();
    let launchpads: Vec<LaunchpadSummary> = pads
        .into_iter()
        .filter(|pad| {
            status
                .as_deref()
                .map_or(true, |wanted| pad.status.eq_ignore_ascii_case(wanted))
        })
        .map(LaunchpadSummary::from)
        .collect();

    LaunchpadList {
        total,
        returned: launchpads.len(),
        status,
        launchpads,
    }
}

pub fn starlink_summary(satellites: &[StarlinkSatellite]) -> StarlinkStats {
    let mut by_version = BTreeMap::new();
    let mut decayed = 0;
    let mut height_sum = 0.0;
    let mut height_count = 0u32;

    for sat in satellites {
        let version = sat.version.clone().unwrap_or_else(|| "unknown".to_string());
        *by_version.entry(version).or_insert(0) += 1;

        if sat.is_decayed() {
            decayed += 1;
        } else if let Some(height) = sat.height_km {
            height_sum += height;
            height_count += 1;
        }
    }

    let average_height_km =
        (height_count > 0).then(|| (height_sum / f64::from(height_count) * 10.0).round() / 10.0);

    StarlinkStats {
        total: satellites.len(),
        in_orbit: satellites.len() - decayed,
        decayed,
        by_version,
        average_height_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::upstream::StaticFetcher;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_active_only_filters_retired_rockets() {
        let rockets: Vec<Rocket> = serde_json::from_value(json!([
            {"id": "r1", "name": "Falcon 1", "active": false},
            {"id": "r2", "name": "Falcon 9", "active": true, "height": {"meters": 70.0}},
        ]))
        .unwrap();

        let list = list_rockets(rockets, true);
        assert_eq!(list.total, 2);
        assert_eq!(list.returned, 1);
        assert_eq!(list.rockets[0].name, "Falcon 9");
        assert_eq!(list.rockets[0].height_meters, Some(70.0));
    }

    #[test]
    fn test_launchpad_status_filter() {
        let pads: Vec<Launchpad> = serde_json::from_value(json!([
            {"id": "p1", "name": "SLC 40", "status": "active", "launch_attempts": 10, "launch_successes": 9},
            {"id": "p2", "name": "Kwajalein", "status": "retired"},
            {"id": "p3", "name": "Starbase", "status": "under construction"},
        ]))
        .unwrap();

        let list = list_launchpads(pads.clone(), Some("active".to_string()));
        assert_eq!(list.returned, 1);
        assert_eq!(list.launchpads[0].success_rate, Some(90.0));

        assert_eq!(list_launchpads(pads, None).returned, 3);
    }

    #[test]
    fn test_starlink_summary_counts() {
        let satellites: Vec<StarlinkSatellite> = serde_json::from_value(json!([
            {"id": "s1", "version": "v1.0", "height_km": 550.0, "spaceTrack": {"DECAYED": 0}},
            {"id": "s2", "version": "v1.0", "height_km": 560.0, "spaceTrack": {"DECAYED": 0}},
            {"id": "s3", "version": "v0.9", "height_km": 120.0, "spaceTrack": {"DECAYED": 1}},
            {"id": "s4", "spaceTrack": {}},
        ]))
        .unwrap();

        let stats = starlink_summary(&satellites);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.decayed, 1);
        assert_eq!(stats.in_orbit, 3);
        assert_eq!(stats.by_version["v1.0"], 2);
        assert_eq!(stats.by_version["unknown"], 1);
        assert_eq!(stats.average_height_km, Some(555.0));
    }

    #[tokio::test]
    async fn test_starlink_handler_shapes_output() {
        let upstream = StaticFetcher::new().with_json(
            paths::STARLINK,
            json!([{"id": "s1", "version": "v1.5", "spaceTrack": {"DECAYED": 0}}]),
        );
        let ctx = HandlerContext::new(STARLINK_STATS, Arc::new(upstream), Ledger::new());

        let output = starlink_stats(ctx, ValidatedInput::default()).await.unwrap();
        assert_eq!(output["inOrbit"], 1);
        assert_eq!(output["byVersion"]["v1.5"], 1);
        assert!(output["averageHeightKm"].is_null());
    }

    #[test]
    fn test_unknown_status_is_rejected_by_contract() {
        let definition = &definitions()[1];
        let errors = definition
            .contract
            .validate(&json!({"status": "on fire"}))
            .unwrap_err();
        assert_eq!(errors[0].field, "status");
    }
}
