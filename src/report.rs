//! Human-readable console output.
//!
//! Nothing here is machine-parsed; the layout only has to stay readable.
//! Multi-line blocks are rendered to strings first so they can be tested.
use crate::fetch::{FetchError, PlanOutcome};
use crate::layout::Layout;
use crate::plan::{FamilySpec, FetchEntry, FetchPlan, FAMILIES};
use crate::workflow::{Change, WalkSummary};
use std::path::Path;

const RULE_WIDTH: usize = 70;
const WALK_RULE_WIDTH: usize = 60;

fn rule(width: usize) -> String {
    "=".repeat(width)
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

pub fn render_banner(spec: &FamilySpec, layout: &Layout) -> String {
    let mut out = String::new();
    push_line(&mut out, &rule(RULE_WIDTH));
    push_line(&mut out, &format!("Downloading {} for ComfyUI", spec.title));
    push_line(&mut out, &rule(RULE_WIDTH));
    push_line(&mut out, &spec.source.describe());
    push_line(
        &mut out,
        &format!("Target: {}", layout.models_dir().display()),
    );
    if let Some(size) = spec.size_hint {
        push_line(&mut out, &format!("Size: {size}"));
    }
    out
}

pub fn render_plan(plan: &FetchPlan) -> String {
    let mut out = String::new();
    push_line(&mut out, "Will download:");
    for entry in &plan.entries {
        push_line(
            &mut out,
            &format!("  • {} → {}", entry.remote, entry.target_path().display()),
        );
    }
    out
}

pub fn print_intro(spec: &FamilySpec, layout: &Layout, plan: &FetchPlan) {
    println!("{}", render_banner(spec, layout));
    println!("{}", render_plan(plan));
}

pub fn fetch_started(entry: &FetchEntry) {
    println!("📥 Downloading {}...", entry.remote);
}

pub fn fetch_saved(path: &Path) {
    println!("   ✓ Saved to: {}", path.display());
    println!();
}

pub fn fetch_skipped(path: &Path) {
    println!("   ✓ Already present: {}", path.display());
    println!();
}

/// Final summary table plus model notes and next steps.
pub fn render_success(spec: &FamilySpec, plan: &FetchPlan) -> String {
    let mut out = String::new();
    push_line(&mut out, &rule(RULE_WIDTH));
    push_line(&mut out, "✅ All files downloaded successfully!");
    push_line(&mut out, "");
    push_line(&mut out, "Downloaded files:");
    for entry in &plan.entries {
        let label = format!("{}:", entry.label);
        push_line(
            &mut out,
            &format!("  {label:<11} {}", entry.target_path().display()),
        );
    }
    if !spec.notes.is_empty() {
        push_line(&mut out, "");
        push_line(&mut out, "Model Info:");
        for note in spec.notes {
            push_line(&mut out, &format!("  • {note}"));
        }
    }
    if !spec.next_steps.is_empty() {
        push_line(&mut out, "");
        push_line(&mut out, "Next steps:");
        for (index, step) in spec.next_steps.iter().enumerate() {
            push_line(&mut out, &format!("  {}. {step}", index + 1));
        }
    }
    push_line(&mut out, &rule(RULE_WIDTH));
    out
}

pub fn print_outcome(spec: &FamilySpec, plan: &FetchPlan, outcome: &PlanOutcome) {
    match outcome {
        PlanOutcome::Completed(_) => print!("{}", render_success(spec, plan)),
        PlanOutcome::Declined => println!("Download cancelled."),
    }
}

pub fn render_failure(err: &FetchError, hints: &[String]) -> String {
    let mut out = String::new();
    match err {
        FetchError::Cancelled { .. } => push_line(&mut out, "❌ Download cancelled by user"),
        _ => push_line(&mut out, &format!("❌ Error downloading: {err}")),
    }
    if !hints.is_empty() {
        push_line(&mut out, "");
        for hint in hints {
            push_line(&mut out, hint);
        }
    }
    out
}

pub fn print_failure(err: &FetchError, hints: &[String]) {
    println!();
    print!("{}", render_failure(err, hints));
}

pub fn print_families(layout: &Layout) {
    for spec in FAMILIES {
        let plan = FetchPlan::for_family(spec.family, layout);
        println!("{} ({})", spec.family.key(), spec.title);
        println!("  {}", spec.source.describe());
        for entry in &plan.entries {
            println!("  • {} → {}", entry.remote, entry.target_path().display());
        }
        println!();
    }
}

pub fn workflow_dir_missing(path: &Path) {
    println!("Workflow directory not found: {}", path.display());
}

pub fn walk_started(total: usize) {
    println!("Found {total} workflow files");
    println!("{}", rule(WALK_RULE_WIDTH));
}

pub fn walk_file(rel: &str) {
    println!();
    println!("Processing: {rel}");
}

pub fn walk_change(change: &Change) {
    println!("  Fixed {change}");
}

pub fn walk_fixed() {
    println!("  ✅ Fixed");
}

pub fn walk_unchanged(label: &str) {
    println!("  ⏭️  {label}");
}

pub fn walk_error(path: &Path, err: &anyhow::Error) {
    println!("Error processing {}: {err:#}", path.display());
}

pub fn render_walk_summary(summary: &WalkSummary) -> String {
    let mut out = String::new();
    push_line(&mut out, "");
    push_line(&mut out, &rule(WALK_RULE_WIDTH));
    push_line(
        &mut out,
        &format!(
            "Fixed {} out of {} workflow files",
            summary.fixed, summary.total
        ),
    );
    if summary.failed > 0 {
        push_line(&mut out, &format!("{} files could not be processed", summary.failed));
    }
    out
}
