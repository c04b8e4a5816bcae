//! Progress reporting for fusion execution

use colored::Colorize;
use fusion_application::ProgressNotifier;
use fusion_domain::{AggregateSession, AggregateState, FanOutResult, Model};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;

/// Write a synthesis fragment to stdout as soon as it arrives.
fn echo_chunk(chunk: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(chunk.as_bytes());
    let _ = stdout.flush();
}

fn finish_echo(session: &AggregateSession) {
    println!();
    if session.state() == AggregateState::Failed {
        eprintln!("{}", "(synthesis ended early)".yellow());
    }
}

fn target_line(result: &FanOutResult) -> String {
    match &result.error {
        None => format!("{} {}", "✓".green(), result.model),
        Some(error) => format!("{} {} ({})", "✗".red(), result.model, error),
    }
}

/// Reports progress during a fusion run with fancy progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
    stream_answer: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
            stream_answer: false,
        }
    }

    /// Echo the aggregated answer to stdout while it is generated
    pub fn with_streaming(mut self, stream_answer: bool) -> Self {
        self.stream_answer = stream_answer;
        self
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_dispatch_start(&self, targets: &[Model]) {
        let pb = self.multi.add(ProgressBar::new(targets.len() as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix("Phase 1: Fan-out");
        pb.set_message(format!("Querying {} models...", targets.len()));

        if let Ok(mut slot) = self.phase_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_target_complete(&self, result: &FanOutResult) {
        if let Ok(slot) = self.phase_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.println(format!("  {}", target_line(result)));
            pb.inc(1);
        }
    }

    fn on_dispatch_complete(&self, results: &[FanOutResult]) {
        let answered = results.iter().filter(|r| r.succeeded).count();
        if let Ok(mut slot) = self.phase_bar.lock()
            && let Some(pb) = slot.take()
        {
            let summary = format!("{}/{} responded", answered, results.len());
            if answered == 0 {
                pb.abandon_with_message(summary.red().to_string());
            } else {
                pb.finish_with_message(summary.green().to_string());
            }
        }
    }

    fn on_aggregate_start(&self, model: &Model) {
        eprintln!(
            "{} {}",
            "Phase 2: Synthesizing with".bold().cyan(),
            model.to_string().bold()
        );
        if self.stream_answer {
            eprintln!();
        }
    }

    fn on_aggregate_chunk(&self, chunk: &str, _accumulated: &str) {
        if self.stream_answer {
            echo_chunk(chunk);
        }
    }

    fn on_aggregate_end(&self, session: &AggregateSession) {
        if self.stream_answer {
            finish_echo(session);
        }
    }
}

/// Simple text-based progress (no fancy UI)
///
/// Used when stderr is not a terminal, where progress bars are hidden.
pub struct SimpleProgress {
    stream_answer: bool,
}

impl SimpleProgress {
    pub fn new() -> Self {
        Self {
            stream_answer: false,
        }
    }

    pub fn with_streaming(mut self, stream_answer: bool) -> Self {
        self.stream_answer = stream_answer;
        self
    }
}

impl Default for SimpleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for SimpleProgress {
    fn on_dispatch_start(&self, targets: &[Model]) {
        eprintln!(
            "{} {} ({} models)",
            "->".cyan(),
            "Phase 1: Fan-out".bold(),
            targets.len()
        );
    }

    fn on_target_complete(&self, result: &FanOutResult) {
        eprintln!("  {}", target_line(result));
    }

    fn on_dispatch_complete(&self, results: &[FanOutResult]) {
        let answered = results.iter().filter(|r| r.succeeded).count();
        eprintln!("  {}/{} responded", answered, results.len());
    }

    fn on_aggregate_start(&self, model: &Model) {
        eprintln!(
            "{} {} {}",
            "->".cyan(),
            "Phase 2: Synthesizing with".bold(),
            model
        );
    }

    fn on_aggregate_chunk(&self, chunk: &str, _accumulated: &str) {
        if self.stream_answer {
            echo_chunk(chunk);
        }
    }

    fn on_aggregate_end(&self, session: &AggregateSession) {
        if self.stream_answer {
            finish_echo(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_domain::{ErrorInfo, ErrorKind};

    #[test]
    fn test_target_line_marks_outcome() {
        colored::control::set_override(false);
        let ok = FanOutResult::success(Model::new("m1"), "4");
        let failed = FanOutResult::failure(
            Model::new("m2"),
            ErrorInfo::new(ErrorKind::RateLimit, "slow down"),
        );

        assert_eq!(target_line(&ok), "✓ m1");
        assert_eq!(target_line(&failed), "✗ m2 (rate_limit error: slow down)");
    }

    #[test]
    fn test_reporter_tolerates_callbacks_without_start() {
        let reporter = ProgressReporter::new();
        reporter.on_target_complete(&FanOutResult::success(Model::new("m1"), "4"));
        reporter.on_dispatch_complete(&[]);
    }
}
