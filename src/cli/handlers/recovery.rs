use std::path::Path;

use chrono::{DateTime, Utc};

use crate::cli::commands::{RecoveryAction, RecoveryCmd, RecoveryPruneArgs};
use crate::cli::output::format_recovery_entry;
use crate::io::recovery::{self, read_recovery_entries, recovery_log_path};
use crate::model::parse_timestamp;

const DEFAULT_LIMIT: usize = 10;

pub(super) fn cmd_recovery(
    data_dir: &Path,
    args: RecoveryCmd,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        Some(RecoveryAction::Prune(prune)) => cmd_prune(data_dir, prune),
        Some(RecoveryAction::Path) => {
            println!("{}", super::display_path(&recovery_log_path(data_dir)));
            Ok(())
        }
        None => cmd_show(data_dir, args.limit, args.since.as_deref(), json),
    }
}

fn cmd_show(
    data_dir: &Path,
    limit: Option<usize>,
    since: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let since = since.map(parse_time).transpose()?;
    let entries = read_recovery_entries(data_dir, Some(limit.unwrap_or(DEFAULT_LIMIT)), since);

    if json {
        let values: Vec<_> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("no recovery entries");
        return Ok(());
    }
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_recovery_entry(entry) {
            println!("{}", line);
        }
    }
    if let Some(summary) = recovery::recovery_summary(data_dir)
        && summary.entry_count > entries.len()
    {
        println!();
        println!(
            "showing {} of {} entries (use --limit to see more)",
            entries.len(),
            summary.entry_count
        );
    }
    Ok(())
}

fn cmd_prune(data_dir: &Path, args: RecoveryPruneArgs) -> Result<(), Box<dyn std::error::Error>> {
    let before = args.before.as_deref().map(parse_time).transpose()?;
    let removed = recovery::prune_recovery(data_dir, before, args.all)?;
    let noun = if removed == 1 { "entry" } else { "entries" };
    println!("pruned {} {}", removed, noun);
    Ok(())
}

/// Full RFC 3339 timestamp, or a bare `YYYY-MM-DD` meaning midnight UTC
fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s)
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
        .ok_or_else(|| format!("invalid timestamp: {}", s))
}
