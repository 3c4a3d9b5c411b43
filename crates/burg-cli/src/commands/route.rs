//! Route guard and scan-link commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use burg_router::{
    Dispatch, GuardState, InAppNavigation, MemoryRouter, RouteGuard, ScanLink, ScanTarget,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct RouteReport {
    path: String,
    verdict: GuardState,
    dispatch: Dispatch,
    location: String,
}

/// Run the guard once for `path` against the current session.
async fn check_route(ctx: &Context, path: &str) -> RouteReport {
    let router = Arc::new(MemoryRouter::new(path));
    let mut guard = RouteGuard::from_config(InAppNavigation::new(router.clone()), &ctx.config);

    let verdict = guard.observe(&ctx.store.state(), path);
    let dispatch = guard.commit().await;

    RouteReport {
        path: path.to_string(),
        verdict,
        dispatch,
        location: router.current(),
    }
}

fn print_report(report: &RouteReport) {
    output::print_row("Path", &report.path);
    output::print_row("Verdict", &format!("{:?}", report.verdict));
    match &report.dispatch {
        Dispatch::Navigated { target, mode } => {
            output::print_row("Redirect", &format!("{} ({:?})", target, mode))
        }
        Dispatch::Abandoned { target } => output::print_row("Redirect", &format!("{} (failed)", target)),
        Dispatch::Idle | Dispatch::Suppressed { .. } => output::print_row("Redirect", "none"),
    }
    output::print_row("Location", &report.location);
}

/// Show where the route guard sends the user for `path`.
pub async fn route(ctx: &Context, path: &str, format: &OutputFormat) -> Result<()> {
    if !path.starts_with('/') {
        anyhow::bail!("path must start with '/', got {:?}", path);
    }

    ctx.store.initialize().await;
    let report = check_route(ctx, path).await;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

/// Show where a scanned QR payload leads.
pub async fn scan(ctx: &Context, text: &str, format: &OutputFormat) -> Result<()> {
    let target = ScanLink::parse(text, &ctx.config.scan_host)?;

    let report = match &target {
        ScanTarget::App { route, .. } => {
            ctx.store.initialize().await;
            Some(check_route(ctx, route).await)
        }
        ScanTarget::External { .. } => None,
    };

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "target": target,
            "route": report,
        })),
        OutputFormat::Text => match (&target, &report) {
            (ScanTarget::App { link, .. }, Some(report)) => {
                output::print_row("Type", &link.entity_type);
                output::print_row("ID", &link.entity_id);
                print_report(report);
            }
            _ => output::print_row("Text", text),
        },
    }
    Ok(())
}
