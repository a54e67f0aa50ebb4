//! Run and garbage collection report formatting

use crate::backup::{GcPreview, RunReport};

/// Format a garbage collection preview
pub fn format_gc_preview(previews: &[GcPreview]) -> String {
    if previews.is_empty() {
        return "No backup sets configured.".to_string();
    }

    let name_width = previews
        .iter()
        .map(|p| p.set.len())
        .max()
        .unwrap_or(3)
        .max(3);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<5}  {:>4}  {:>5}  {}\n",
        "Set",
        "Tier",
        "Keep",
        "Stale",
        "To remove",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<5}  {:->4}  {:->5}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for preview in previews {
        let stale: Vec<String> = preview.stale.iter().map(|s| s.name()).collect();
        output.push_str(&format!(
            "{:<name_width$}  {:<5}  {:>4}  {:>5}  {}\n",
            preview.set,
            preview.tier.to_string(),
            preview.retention,
            stale.len(),
            stale.join(", "),
            name_width = name_width,
        ));
    }

    let total: usize = previews.iter().map(|p| p.stale.len()).sum();
    output.push_str(&format!("\nTotal: {} stale snapshot(s)\n", total));
    output
}

/// Format the outcome of a run
pub fn format_run_report(report: &RunReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Backup run for {} (cycle {}/{})\n",
        report.plan.date,
        report.plan.cycle_index + 1,
        report.plan.cycle_len
    ));

    for run in &report.completed {
        output.push_str(&format!("  ok       {:<12} {}\n", run.level.to_string(), run.set));
    }
    for set in &report.skipped {
        output.push_str(&format!("  skipped  {:<12} {}\n", "incremental", set));
    }
    for failure in &report.failed {
        output.push_str(&format!(
            "  FAILED   {:<12} {}: {}\n",
            failure.level.to_string(),
            failure.set,
            failure.reason
        ));
    }

    if report.dry_run {
        output.push_str(&format!(
            "Garbage collection (dry run): {} snapshot(s) would be removed",
            report.gc.removed_count()
        ));
    } else {
        output.push_str(&format!(
            "Garbage collection: {} snapshot(s) removed",
            report.gc.removed_count()
        ));
    }
    if !report.gc.held.is_empty() {
        output.push_str(&format!(", skipped {}", report.gc.held.join(", ")));
    }
    if !report.gc.failed.is_empty() {
        output.push_str(&format!(
            ", listing failed for {}",
            report.gc.failed.join(", ")
        ));
    }
    output.push('\n');
    output
}
