#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use spacex_agent::config::AgentConfig;
use spacex_agent::entrypoints::build_registry;
use spacex_agent::ledger::Ledger;
use spacex_agent::payments::PaymentGateway;
use spacex_agent::registry::EntrypointRegistry;
use spacex_agent::upstream::StaticFetcher;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// SpaceX fixtures
// =============================================================================

pub const FALCON9_ID: &str = "5e9d0d95eda69973a809d1ec";
pub const STARSHIP_ID: &str = "5e9d0d96eda699382d09d1ee";

pub fn rockets_fixture() -> Value {
    json!([
        {
            "id": FALCON9_ID,
            "name": "Falcon 9",
            "type": "rocket",
            "active": true,
            "stages": 2,
            "cost_per_launch": 50000000,
            "success_rate_pct": 98,
            "height": {"meters": 70},
            "mass": {"kg": 549054}
        },
        {
            "id": STARSHIP_ID,
            "name": "Starship",
            "type": "rocket",
            "active": false,
            "stages": 2,
            "height": {"meters": 118}
        }
    ])
}

fn upcoming(flight: u32, rocket: &str) -> Value {
    json!({
        "id": format!("upcoming-{}", flight),
        "name": format!("Flight {}", flight),
        "flight_number": flight,
        "date_utc": format!("2027-01-{:02}T00:00:00.000Z", flight),
        "upcoming": true,
        "success": null,
        "rocket": rocket,
        "launchpad": "pad-1",
        "links": {"webcast": null, "patch": {"small": null}}
    })
}

/// Three Starship and two Falcon 9 launches, interleaved.
pub fn upcoming_launches_fixture() -> Value {
    json!([
        upcoming(1, STARSHIP_ID),
        upcoming(2, FALCON9_ID),
        upcoming(3, STARSHIP_ID),
        upcoming(4, FALCON9_ID),
        upcoming(5, STARSHIP_ID),
    ])
}

pub fn past_launches_fixture() -> Value {
    json!([
        {"id": "past-1", "name": "FalconSat", "date_unix": 1143239400, "success": false, "rocket": FALCON9_ID},
        {"id": "past-2", "name": "CRS-20", "date_unix": 1583556631, "success": true, "rocket": FALCON9_ID},
        {"id": "past-3", "name": "Crew-5", "date_unix": 1664900000, "success": true, "rocket": FALCON9_ID}
    ])
}

pub fn company_fixture() -> Value {
    json!({
        "name": "SpaceX",
        "founder": "Elon Musk",
        "founded": 2002,
        "employees": 9500,
        "valuation": 74000000000u64,
        "headquarters": {"address": "Rocket Road", "city": "Hawthorne", "state": "California"},
        "links": {"website": "https://www.spacex.com/"}
    })
}

pub fn launchpads_fixture() -> Value {
    json!([
        {"id": "pad-1", "name": "CCSFS SLC 40", "status": "active", "launch_attempts": 99, "launch_successes": 97},
        {"id": "pad-2", "name": "Kwajalein Atoll", "status": "retired", "launch_attempts": 5, "launch_successes": 2}
    ])
}

/// Upstream serving every resource the catalogue reads.
pub fn spacex_upstream() -> StaticFetcher {
    StaticFetcher::new()
        .with_json("/launches/latest", json!({"id": "past-3", "name": "Crew-5", "rocket": FALCON9_ID, "success": true}))
        .with_json("/launches/next", upcoming(1, STARSHIP_ID))
        .with_json("/launches/upcoming", upcoming_launches_fixture())
        .with_json("/launches/past", past_launches_fixture())
        .with_json("/rockets", rockets_fixture())
        .with_json("/launchpads", launchpads_fixture())
        .with_json("/company", company_fixture())
        .with_json("/roadster", json!({"name": "Elon Musk's Tesla Roadster", "orbit_type": "heliocentric"}))
        .with_json(
            "/starlink",
            json!([
                {"id": "s1", "version": "v1.0", "height_km": 550.0, "spaceTrack": {"DECAYED": 0}},
                {"id": "s2", "version": "v1.5", "height_km": 540.0, "spaceTrack": {"DECAYED": 0}},
                {"id": "s3", "version": "v0.9", "spaceTrack": {"DECAYED": 1}}
            ]),
        )
}

/// Registry over `upstream` with default pricing and a fresh in-memory ledger.
pub fn registry_with(
    config: &AgentConfig,
    upstream: StaticFetcher,
    gateway: Arc<dyn PaymentGateway>,
) -> (EntrypointRegistry, Ledger) {
    let ledger = Ledger::new();
    let registry = build_registry(config, Arc::new(upstream), gateway, ledger.clone())
        .expect("catalogue builds");
    (registry, ledger)
}
