//! CLI output formatting for transforms and batches.
//!
//! # Information-First Display
//!
//! Every picture leads with its positional index and id. What happened to it
//! (effects, fallback reason) follows as indented context lines, so a batch
//! log reads as an inventory of the deck's pictures.
//!
//! # Output Format
//!
//! ## Batch
//!
//! ```text
//! Transforming 3 pictures (3 at a time)
//!     001 slide2-pic1
//!         srcRect crop: 70x70 at (10, 10) from 100x100
//!         fillRect stretch: left=-0.04881, top=0.06029, right=0.30709, bottom=0.06029
//!     002 slide3-logo: unchanged
//!     003 slide5-chart: kept original
//!         Error: Invalid image: unexpected end of file
//!
//! Transformed 1, unchanged 1, kept original 1
//! ```
//!
//! ## Transform
//!
//! ```text
//! out.png (1350x759, image/png)
//!     fillRect stretch: left=-0.04881, top=0.06029, right=0.30709, bottom=0.06029
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::AppliedEffect;
use crate::process::{BatchSummary, ProcessEvent, ProcessedImage};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Picture header line from a 0-based batch index.
fn picture_line(index: usize, id: &str) -> String {
    format!("{}{} {}", indent(1), format_index(index + 1), id)
}

/// Effect log lines at the given depth.
pub fn format_effects<S: AsRef<str>>(effects: &[S], depth: usize) -> Vec<String> {
    effects
        .iter()
        .map(|e| format!("{}{}", indent(depth), e.as_ref()))
        .collect()
}

// ============================================================================
// Batch output
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted {
            image_count,
            concurrency,
        } => vec![format!(
            "Transforming {} pictures ({} at a time)",
            image_count, concurrency
        )],
        ProcessEvent::ImageTransformed { index, id, effects } => {
            let mut lines = vec![picture_line(*index, id)];
            lines.extend(format_effects(effects, 2));
            lines
        }
        ProcessEvent::ImageSkipped { index, id } => {
            vec![format!("{}: unchanged", picture_line(*index, id))]
        }
        ProcessEvent::ImageFellBack { index, id, error } => vec![
            format!("{}: kept original", picture_line(*index, id)),
            format!("{}Error: {}", indent(2), error),
        ],
    }
}

/// Format the closing summary of a batch.
pub fn format_batch_summary(summary: &BatchSummary, out_dir: &Path) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Transformed {}, unchanged {}, kept original {}",
            summary.transformed, summary.skipped, summary.fell_back
        ),
        format!("Results: {}", out_dir.join("results.json").display()),
    ]
}

pub fn print_batch_summary(summary: &BatchSummary, out_dir: &Path) {
    for line in format_batch_summary(summary, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Single transform output
// ============================================================================

/// Format the report for the `transform` command.
pub fn format_transform_output(
    output: &Path,
    dimensions: Option<(u32, u32)>,
    result: &ProcessedImage,
) -> Vec<String> {
    let size = dimensions
        .map(|(w, h)| format!("{}x{}, ", w, h))
        .unwrap_or_default();
    let mut lines = vec![format!(
        "{} ({}{})",
        output.display(),
        size,
        result.mime_type()
    )];

    match &result.error {
        Some(error) => {
            lines.push(format!("{}Kept original: {}", indent(1), error));
        }
        None if !result.was_processed => {
            lines.push(format!("{}Unchanged: no fill rect offset", indent(1)));
        }
        None => {
            let effects: Vec<String> = result
                .applied_effects
                .iter()
                .map(AppliedEffect::to_string)
                .collect();
            lines.extend(format_effects(&effects, 1));
        }
    }
    lines
}

pub fn print_transform_output(output: &Path, dimensions: Option<(u32, u32)>, result: &ProcessedImage) {
    for line in format_transform_output(output, dimensions, result) {
        println!("{}", line);
    }
}
