//! Free reference entrypoints.

use super::model::{Company, CompanySummary, Roadster, RoadsterSummary};
use super::{paths, to_output};
use crate::registry::{
    handler_fn, EntrypointDefinition, HandlerContext, HandlerResult, ValidatedInput,
};

pub const COMPANY_INFO: &str = "company-info";
pub const ROADSTER: &str = "roadster";

pub fn definitions() -> Vec<EntrypointDefinition> {
    vec![
        EntrypointDefinition::new(
            COMPANY_INFO,
            "SpaceX company profile",
            handler_fn(company_info),
        ),
        EntrypointDefinition::new(
            ROADSTER,
            "Orbital data for the Tesla Roadster launched on Falcon Heavy",
            handler_fn(roadster),
        ),
    ]
}

async fn company_info(ctx: HandlerContext, _input: ValidatedInput) -> HandlerResult {
    let company: Company = ctx.fetch(paths::COMPANY).await?;
    to_output(&CompanySummary::from(company))
}

async fn roadster(ctx: HandlerContext, _input: ValidatedInput) -> HandlerResult {
    let roadster: Roadster = ctx.fetch(paths::ROADSTER).await?;
    to_output(&RoadsterSummary::from(roadster))
}
