// src/utils/log.rs

//! Console report helpers on top of the `log` facade.

use crate::models::RunReport;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

/// Summary rows for a finished run.
pub fn report_items(report: &RunReport) -> Vec<(&'static str, String)> {
    let counters = &report.counters;
    let duration = report.end_time - report.start_time;
    vec![
        ("Stopped", report.termination.to_string()),
        ("Total posts checked", counters.items_processed.to_string()),
        ("Pages advanced", counters.pages_fetched.to_string()),
        ("Flagged as scam", counters.items_flagged.to_string()),
        ("Deleted", counters.deletions_succeeded.to_string()),
        ("Delete failures", counters.deletions_failed.to_string()),
        ("Rate-limit retries", counters.rate_limit_retries.to_string()),
        (
            "Saved",
            match report.flushed {
                Some(count) => format!("{} entries to {}", count, report.output_location),
                None => format!("FAILED ({})", report.output_location),
            },
        ),
        (
            "Duration",
            format!("{:.1}s", duration.num_milliseconds() as f64 / 1000.0),
        ),
    ]
}
