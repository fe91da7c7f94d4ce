//! Upstream SpaceX v4 payloads and the shaped objects returned to callers.
//!
//! Upstream structs only declare the fields the agent reads; everything is
//! defaulted so that schema drift upstream degrades to `null` rather than a
//! decode failure.

use serde::{Deserialize, Serialize};

// =============================================================================
// Upstream payloads
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Launch {
    pub id: String,
    pub name: String,
    pub flight_number: Option<u32>,
    pub date_utc: Option<String>,
    pub date_unix: Option<i64>,
    pub upcoming: bool,
    pub success: Option<bool>,
    pub details: Option<String>,
    pub rocket: Option<String>,
    pub launchpad: Option<String>,
    pub links: LaunchLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LaunchLinks {
    pub webcast: Option<String>,
    pub article: Option<String>,
    pub wikipedia: Option<String>,
    pub patch: PatchLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatchLinks {
    pub small: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Rocket {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub active: bool,
    pub stages: Option<u32>,
    pub cost_per_launch: Option<u64>,
    pub success_rate_pct: Option<f64>,
    pub first_flight: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub height: Dimension,
    pub mass: Mass,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dimension {
    pub meters: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Mass {
    pub kg: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Launchpad {
    pub id: String,
    pub name: String,
    pub full_name: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub status: String,
    pub launch_attempts: u32,
    pub launch_successes: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StarlinkSatellite {
    pub id: String,
    pub version: Option<String>,
    pub height_km: Option<f64>,
    pub latitude: Option<f64>,
    #[serde(rename = "spaceTrack")]
    pub space_track: SpaceTrack,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpaceTrack {
    #[serde(rename = "DECAYED")]
    pub decayed: Option<i64>,
}

impl StarlinkSatellite {
    pub fn is_decayed(&self) -> bool {
        self.space_track.decayed.unwrap_or(0) != 0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
    pub founder: Option<String>,
    pub founded: Option<u32>,
    pub employees: Option<u32>,
    pub vehicles: Option<u32>,
    pub launch_sites: Option<u32>,
    pub test_sites: Option<u32>,
    pub ceo: Option<String>,
    pub cto: Option<String>,
    pub coo: Option<String>,
    pub valuation: Option<u64>,
    pub headquarters: Headquarters,
    pub links: CompanyLinks,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Headquarters {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyLinks {
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Roadster {
    pub name: String,
    pub launch_date_utc: Option<String>,
    pub launch_mass_kg: Option<f64>,
    pub norad_id: Option<u32>,
    pub orbit_type: Option<String>,
    pub period_days: Option<f64>,
    pub speed_kph: Option<f64>,
    pub earth_distance_km: Option<f64>,
    pub mars_distance_km: Option<f64>,
    pub apoapsis_au: Option<f64>,
    pub periapsis_au: Option<f64>,
    pub inclination: Option<f64>,
    pub details: Option<String>,
    pub wikipedia: Option<String>,
    pub video: Option<String>,
}

// =============================================================================
// Shaped outputs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSummary {
    pub id: String,
    pub name: String,
    pub flight_number: Option<u32>,
    pub date_utc: Option<String>,
    pub upcoming: bool,
    pub success: Option<bool>,
    pub details: Option<String>,
    pub rocket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rocket_name: Option<String>,
    pub launchpad_id: Option<String>,
    pub webcast: Option<String>,
    pub article: Option<String>,
    pub wikipedia: Option<String>,
    pub patch: Option<String>,
}

impl LaunchSummary {
    pub fn from_launch(launch: Launch, rocket_name: Option<String>) -> Self {
        Self {
            id: launch.id,
            name: launch.name,
            flight_number: launch.flight_number,
            date_utc: launch.date_utc,
            upcoming: launch.upcoming,
            success: launch.success,
            details: launch.details,
            rocket_id: launch.rocket,
            rocket_name,
            launchpad_id: launch.launchpad,
            webcast: launch.links.webcast,
            article: launch.links.article,
            wikipedia: launch.links.wikipedia,
            patch: launch.links.patch.small,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RocketSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub active: bool,
    pub stages: Option<u32>,
    pub cost_per_launch: Option<u64>,
    pub success_rate_pct: Option<f64>,
    pub first_flight: Option<String>,
    pub country: Option<String>,
    pub height_meters: Option<f64>,
    pub mass_kg: Option<f64>,
    pub description: Option<String>,
}

impl From<Rocket> for RocketSummary {
    fn from(rocket: Rocket) -> Self {
        Self {
            id: rocket.id,
            name: rocket.name,
            kind: rocket.kind,
            active: rocket.active,
            stages: rocket.stages,
            cost_per_launch: rocket.cost_per_launch,
            success_rate_pct: rocket.success_rate_pct,
            first_flight: rocket.first_flight,
            country: rocket.country,
            height_meters: rocket.height.meters,
            mass_kg: rocket.mass.kg,
            description: rocket.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchpadSummary {
    pub id: String,
    pub name: String,
    pub full_name: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub status: String,
    pub launch_attempts: u32,
    pub launch_successes: u32,
    /// Percentage with one decimal, `None` before the first attempt
    pub success_rate: Option<f64>,
}

impl From<Launchpad> for LaunchpadSummary {
    fn from(pad: Launchpad) -> Self {
        let success_rate = (pad.launch_attempts > 0).then(|| {
            let pct = f64::from(pad.launch_successes) * 100.0 / f64::from(pad.launch_attempts);
            (pct * 10.0).round() / 10.0
        });
        Self {
            id: pad.id,
            name: pad.name,
            full_name: pad.full_name,
            locality: pad.locality,
            region: pad.region,
            status: pad.status,
            launch_attempts: pad.launch_attempts,
            launch_successes: pad.launch_successes,
            success_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub name: String,
    pub founder: Option<String>,
    pub founded: Option<u32>,
    pub employees: Option<u32>,
    pub vehicles: Option<u32>,
    pub launch_sites: Option<u32>,
    pub test_sites: Option<u32>,
    pub ceo: Option<String>,
    pub cto: Option<String>,
    pub coo: Option<String>,
    pub valuation: Option<u64>,
    pub headquarters: Headquarters,
    pub website: Option<String>,
    pub summary: Option<String>,
}

impl From<Company> for CompanySummary {
    fn from(company: Company) -> Self {
        Self {
            name: company.name,
            founder: company.founder,
            founded: company.founded,
            employees: company.employees,
            vehicles: company.vehicles,
            launch_sites: company.launch_sites,
            test_sites: company.test_sites,
            ceo: company.ceo,
            cto: company.cto,
            coo: company.coo,
            valuation: company.valuation,
            headquarters: company.headquarters,
            website: company.links.website,
            summary: company.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadsterSummary {
    pub name: String,
    pub launch_date_utc: Option<String>,
    pub launch_mass_kg: Option<f64>,
    pub norad_id: Option<u32>,
    pub orbit_type: Option<String>,
    pub period_days: Option<f64>,
    pub speed_kph: Option<f64>,
    pub earth_distance_km: Option<f64>,
    pub mars_distance_km: Option<f64>,
    pub apoapsis_au: Option<f64>,
    pub periapsis_au: Option<f64>,
    pub inclination: Option<f64>,
    pub details: Option<String>,
    pub wikipedia: Option<String>,
    pub video: Option<String>,
}

impl From<Roadster> for RoadsterSummary {
    fn from(r: Roadster) -> Self {
        Self {
            name: r.name,
            launch_date_utc: r.launch_date_utc,
            launch_mass_kg: r.launch_mass_kg,
            norad_id: r.norad_id,
            orbit_type: r.orbit_type,
            period_days: r.period_days,
            speed_kph: r.speed_kph,
            earth_distance_km: r.earth_distance_km,
            mars_distance_km: r.mars_distance_km,
            apoapsis_au: r.apoapsis_au,
            periapsis_au: r.periapsis_au,
            inclination: r.inclination,
            details: r.details,
            wikipedia: r.wikipedia,
            video: r.video,
        }
    }
}
