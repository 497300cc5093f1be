use crate::error::{ExportError, UserFriendlyError};
use crate::exporter::{ExportProgress, ExportReport};
use console::{style, Emoji, Term};
use serde_json;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &ExportError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_export_summary(&self, progress: &ExportProgress, output_location: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(progress, output_location),
            OutputMode::Json => self.print_json_summary(progress, output_location),
            OutputMode::Plain => self.print_plain_summary(progress, output_location),
        }
    }

    pub fn print_export_report(&self, report: &ExportReport) {
        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, progress: &ExportProgress, output_location: &str) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{} {}",
                style("Export completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Export completed!");
        }

        println!();
        println!(
            "  Total exported files: {}",
            if self.use_colors {
                style(progress.files_exported).cyan().bold().to_string()
            } else {
                progress.files_exported.to_string()
            }
        );
        println!(
            "  Output location:      {}",
            if self.use_colors {
                style(output_location).cyan().bold().to_string()
            } else {
                output_location.to_string()
            }
        );
        println!(
            "  Bytes written:        {}",
            if self.use_colors {
                style(format_bytes(progress.bytes_written))
                    .cyan()
                    .bold()
                    .to_string()
            } else {
                format_bytes(progress.bytes_written)
            }
        );
        println!(
            "  Time taken:           {}",
            if self.use_colors {
                style(format_duration(progress.elapsed()))
                    .cyan()
                    .bold()
                    .to_string()
            } else {
                format_duration(progress.elapsed())
            }
        );

        if !progress.failures.is_empty() {
            println!("  Failures:             {}", progress.failures.len());
        }

        self.print_separator();
    }

    fn print_json_summary(&self, progress: &ExportProgress, output_location: &str) {
        let summary = serde_json::json!({
            "type": "summary",
            "files_exported": progress.files_exported,
            "bytes_written": progress.bytes_written,
            "output_location": output_location,
            "duration_ms": progress.elapsed().as_millis(),
            "failures": progress.failures.len(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, progress: &ExportProgress, output_location: &str) {
        println!("COMPLETED: Export");
        println!("Total exported files: {}", progress.files_exported);
        println!("Output location: {}", output_location);
        println!("Bytes written: {}", progress.bytes_written);
        println!("Duration: {:?}", progress.elapsed());
        if !progress.failures.is_empty() {
            println!("Failures: {}", progress.failures.len());
        }
    }

    fn print_human_report(&self, report: &ExportReport) {
        println!("Source root: {}", report.root_path);
        println!("Layout: {}", report.layout);
        println!("Output location: {}", report.output_location);
        println!(
            "Exported at: {}",
            report.export_time.format("%Y-%m-%d %H:%M UTC")
        );
        println!();

        if !report.export_summary.files_by_extension.is_empty() {
            println!("Files by type:");
            let mut extensions: Vec<_> =
                report.export_summary.files_by_extension.iter().collect();
            extensions.sort_by(|a, b| b.1.cmp(a.1));

            for (ext, count) in extensions {
                println!("  {}: {} files", ext, count);
            }
            println!();
        }

        if !report.failures.is_empty() {
            println!("Failures:");
            for failure in &report.failures {
                println!("  - {}: {}", failure.path, failure.message);
            }
        }
    }

    fn print_plain_report(&self, report: &ExportReport) {
        println!("REPORT: Export completed");
        println!("Source root: {}", report.root_path);
        println!("Files: {}", report.export_summary.total_files_exported);
        println!("Size: {} bytes", report.export_summary.total_bytes_written);
        println!("Output: {}", report.output_location);

        if !report.failures.is_empty() {
            println!("Failures: {}", report.failures.len());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
