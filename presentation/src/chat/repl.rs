//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use fusion_application::{
    ExecutionParams, LlmGateway, NoProgress, RunFusionError, RunFusionUseCase,
};
use fusion_domain::{GenerationOptions, Model, OutputFormat, QueryRequest};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// Slash commands understood by the REPL
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    Help,
    Models,
    Unknown(String),
}

impl ReplCommand {
    fn parse(line: &str) -> Self {
        match line {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/models" => ReplCommand::Models,
            other => ReplCommand::Unknown(other.to_string()),
        }
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    gateway: Arc<dyn LlmGateway>,
    params: ExecutionParams,
    targets: Vec<Model>,
    aggregator: Model,
    instructions: Option<String>,
    reference_options: GenerationOptions,
    format: OutputFormat,
    show_progress: bool,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(gateway: Arc<dyn LlmGateway>, targets: Vec<Model>, aggregator: Model) -> Self {
        Self {
            gateway,
            params: ExecutionParams::default(),
            targets,
            aggregator,
            instructions: None,
            reference_options: GenerationOptions::reference_defaults(),
            format: OutputFormat::Synthesis,
            show_progress: true,
            history_path: Self::default_history_path(),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_reference_options(mut self, options: GenerationOptions) -> Self {
        self.reference_options = options;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Override the history file location
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.history_path = path;
        }
        self
    }

    fn default_history_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("agent-fusion").join("history.txt"))
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = self.history_path.as_ref() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("History disabled ({}): {}", path.display(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("fusion".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.process_question(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          Agent Fusion - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "References: {}",
            self.targets
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("Aggregator: {}", self.aggregator);
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /models          - Show current models");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, cmd: &str) -> bool {
        match ReplCommand::parse(cmd) {
            ReplCommand::Quit => {
                println!("Bye!");
                true
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
                false
            }
            ReplCommand::Models => {
                println!();
                println!("Reference models:");
                for model in &self.targets {
                    println!("  - {}", model);
                }
                println!("Aggregator: {}", self.aggregator);
                println!();
                false
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    fn build_request(&self, question: &str) -> QueryRequest {
        let request = QueryRequest::new(question, self.targets.clone(), self.aggregator.clone())
            .with_reference_options(self.reference_options);
        match &self.instructions {
            Some(instructions) => request.with_instructions(instructions.clone()),
            None => request,
        }
    }

    async fn process_question(&self, question: &str) {
        println!();

        // Ctrl-C cancels this question only; the REPL keeps running.
        let token = CancellationToken::new();
        let watcher = {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            })
        };

        let use_case = RunFusionUseCase::with_params(Arc::clone(&self.gateway), self.params.clone())
            .with_cancellation(token);
        let request = self.build_request(question);
        let streamed = self.show_progress && self.format == OutputFormat::Synthesis;

        let result = if self.show_progress {
            let progress = ProgressReporter::new().with_streaming(streamed);
            use_case.execute_with_progress(&request, &progress).await
        } else {
            use_case.execute_with_progress(&request, &NoProgress).await
        };
        watcher.abort();

        match result {
            Ok(result) if streamed => {
                println!("{}", ConsoleFormatter::format_summary(&result));
            }
            Ok(result) => {
                println!("{}", ConsoleFormatter::render(&result, self.format));
            }
            Err(e) => {
                if let Some(partial) = unshown_partial(&e, streamed) {
                    println!("{}", partial);
                }
                if e.is_cancelled() {
                    eprintln!("{}", "Cancelled.".yellow());
                } else {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
            }
        }
        println!();
    }
}

/// Synthesis text from a failed run that was not already echoed while
/// streaming.
fn unshown_partial(error: &RunFusionError, streamed: bool) -> Option<&str> {
    if streamed {
        return None;
    }
    error.partial_text().filter(|partial| !partial.is_empty())
}
