//! Console output formatter for fusion results

use colored::Colorize;
use fusion_domain::{FusionResult, OutputFormat};

/// Formats fusion results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render a result in the requested format
    pub fn render(result: &FusionResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(result),
            OutputFormat::Synthesis => Self::format_synthesis_only(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Format the complete result
    pub fn format(result: &FusionResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Agent Fusion Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            result.prompt
        ));

        output.push_str(&format!(
            "{} {}\n",
            "Models:".cyan().bold(),
            Self::model_list(result)
        ));

        // Phase 1: Reference responses
        output.push_str(&Self::section_header("Phase 1: Reference Responses"));
        for response in &result.references {
            if response.succeeded {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", response.model).yellow().bold(),
                    response.text
                ));
            } else {
                let error = response
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    format!("── {} ──", response.model).red().bold(),
                    error
                ));
            }
        }

        // Phase 2: Aggregation
        output.push_str(&Self::section_header("Phase 2: Aggregated Answer"));
        output.push_str(&format!(
            "\n{}\n\n{}\n",
            format!("Aggregator: {}", result.aggregator).yellow().bold(),
            result.answer
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &FusionResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(result: &FusionResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Fused Answer ===".cyan().bold()
        ));

        output.push_str(&format!("{} {}\n\n", "Q:".bold(), result.prompt));

        output.push_str(&format!(
            "{} {}\n\n",
            "Models consulted:".dimmed(),
            Self::model_list(result)
        ));

        output.push_str(&result.answer);
        output.push('\n');

        output
    }

    /// One-line trailer printed after a streamed answer
    pub fn format_summary(result: &FusionResult) -> String {
        let answered = result.successful().count();
        let total = result.references.len();
        let mut line = format!(
            "Synthesized by {} from {}/{} reference responses",
            result.aggregator, answered, total
        );
        let failed: Vec<String> = result.failed().map(|r| r.model.to_string()).collect();
        if !failed.is_empty() {
            line.push_str(&format!(" (failed: {})", failed.join(", ")));
        }
        line.dimmed().to_string()
    }

    /// Reference models, with failed ones marked
    fn model_list(result: &FusionResult) -> String {
        result
            .references
            .iter()
            .map(|r| {
                if r.succeeded {
                    r.model.to_string()
                } else {
                    format!("{} (failed)", r.model)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
