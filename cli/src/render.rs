// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text summaries for the CLI.

use chessnet_core::{MigrationReport, PipelineReport};

/// Render a migration report as an indented list
pub fn render_migration(report: &MigrationReport) -> String {
    if report.is_noop() {
        return "  already in legacy form, nothing changed\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("  input shapes renamed:   {}\n", report.renamed_shapes));
    output.push_str(&format!(
        "  layers rewired:         {} ({} call events)\n",
        report.converted_layers, report.converted_events
    ));
    output.push_str(&format!("  layer lists wrapped:    {}\n", report.wrapped_layer_lists));

    if report.is_lossy() {
        output.push_str(&format!(
            "  dropped:                {} arguments, {} call events (no keras_history)\n",
            report.dropped_arguments, report.dropped_events
        ));
    }

    output
}

/// Render the outcome of a full run
pub fn render_pipeline(report: &PipelineReport) -> String {
    let mut output = format!("Migrated {} layers\n", report.layers);
    output.push_str(&render_migration(&report.migration));
    match &report.written_to {
        Some(path) => output.push_str(&format!("Patched: {}\n", path.display())),
        None => output.push_str("Dry run: nothing written\n"),
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_summary() {
        let text = render_migration(&MigrationReport::default());
        assert!(text.contains("already in legacy form"));
    }

    #[test]
    fn lossy_summary_mentions_drops() {
        let report = MigrationReport {
            converted_layers: 2,
            converted_events: 1,
            dropped_arguments: 3,
            dropped_events: 1,
            ..MigrationReport::default()
        };
        let text = render_migration(&report);
        assert!(text.contains("2 (1 call events)"));
        assert!(text.contains("3 arguments, 1 call events"));
    }

    #[test]
    fn dry_run_footer() {
        let report = PipelineReport {
            migration: MigrationReport::default(),
            layers: 4,
            written_to: None,
        };
        let text = render_pipeline(&report);
        assert!(text.starts_with("Migrated 4 layers"));
        assert!(text.ends_with("Dry run: nothing written\n"));
    }
}
