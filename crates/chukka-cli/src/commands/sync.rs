use chukka_core::sync::{retire_unseen, retire_unseen_kind, KindReport, SyncReport};
use chukka_core::util::unix_timestamp_ms;

use crate::cli::KindArg;
use crate::commands::common::{parse_local_id, print_json, CommandContext};
use crate::error::CliError;

pub async fn run_pull(
    kind: Option<KindArg>,
    as_json: bool,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let service = ctx.open_service()?;

    let report = match kind {
        Some(kind) => SyncReport {
            kinds: vec![service.pull_kind(kind.entity()).await?],
        },
        None => service.pull_all().await,
    };

    if as_json {
        print_json(&report)?;
    } else {
        for kind_report in &report.kinds {
            println!("{}", report_line(kind_report));
        }
        if !report.has_failures() {
            println!(
                "Pull completed: {} inserted, {} updated, {} skipped",
                report.inserted(),
                report.updated(),
                report.skipped()
            );
        }
    }

    if report.has_failures() {
        return Err(CliError::PullIncomplete);
    }
    Ok(())
}

pub async fn run_push(
    kind: KindArg,
    local_id: &str,
    as_json: bool,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let service = ctx.open_service()?;
    let id = parse_local_id(local_id)?;
    let outcome = service.push(kind.entity(), id).await?;

    if as_json {
        print_json(&outcome)?;
        return Ok(());
    }

    if outcome.created {
        println!("Pushed {id}: created remote record {}", outcome.remote_id);
    } else {
        println!("Pushed {id}: updated remote record {}", outcome.remote_id);
    }
    Ok(())
}

/// Retire soft-deletable records no pull has returned for the given window.
/// Never talks to the server; the caller decides when absence means remote
/// deletion.
pub fn run_prune(
    kind: Option<KindArg>,
    older_than_hours: u32,
    as_json: bool,
    ctx: &CommandContext,
) -> Result<(), CliError> {
    let db = ctx.open_database()?;
    let cutoff_ms = unix_timestamp_ms() - i64::from(older_than_hours) * 60 * 60 * 1000;

    let report = match kind {
        Some(kind) => retire_unseen_kind(&db, kind.entity(), cutoff_ms)?,
        None => retire_unseen(&db, cutoff_ms)?,
    };

    if as_json {
        print_json(&report)?;
        return Ok(());
    }

    if report.total() == 0 {
        println!("Nothing to prune.");
        return Ok(());
    }
    for (kind, retired) in &report.retired {
        println!("{kind}: retired {retired}");
    }
    Ok(())
}

fn report_line(report: &KindReport) -> String {
    let kind = report.kind.to_string();
    if let Some(error) = &report.error {
        return format!("{kind:<10}  failed: {error}");
    }

    let mut line = format!(
        "{kind:<10}  inserted {} updated {} skipped {}",
        report.inserted, report.updated, report.skipped
    );
    if report.failed_requests > 0 {
        line.push_str(&format!(" ({} requests failed)", report.failed_requests));
    }
    line
}
