//! `awning auto`: one weather- and sun-driven automation pass.

use chrono::Utc;
use owo_colors::OwoColorize;

use awning_config::Settings;
use awning_core::{Automation, NotifierConfig, RunReport, adapter};

use crate::cli::{AutoArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: &AutoArgs,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = settings.automation()?;

    let device = config.bridge.client().map_err(CliError::ClientSetup)?;
    let weather = adapter::weather_client().map_err(CliError::ClientSetup)?;
    let notifier = config
        .notifier
        .as_ref()
        .map(NotifierConfig::client)
        .transpose()
        .map_err(CliError::ClientSetup)?;

    let report = Automation::new(device, weather, config.location, config.thresholds)
        .with_notifier(notifier)
        .dry_run(args.dry_run)
        .run(Utc::now())
        .await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &report, |r| summary(r, color))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn summary(report: &RunReport, color: bool) -> String {
    let verdict = if report.decision.should_open { "OPEN" } else { "CLOSED" };
    let verdict = match (color, report.decision.should_open) {
        (true, true) => verdict.green().bold().to_string(),
        (true, false) => verdict.blue().bold().to_string(),
        (false, _) => verdict.to_owned(),
    };

    let awning = match report.state_after {
        Some(after) => format!("{} -> {after}", report.state_before),
        None => format!("{} (dry run, not commanded)", report.state_before),
    };

    [
        format!("Decision:   {verdict}"),
        format!("Reason:     {}", report.decision.reason),
        format!("Conditions: {}", report.decision.checklist()),
        format!(
            "Sun:        {:.1}° azimuth, {:.1}° altitude",
            report.sun.azimuth_deg, report.sun.altitude_deg
        ),
        format!("Awning:     {awning}"),
    ]
    .join("\n")
}
