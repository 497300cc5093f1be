use clap::Parser;
use codexport::{
    Cli, CodeExport, ExportError, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::io::BufRead;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create CodeExport instance
    let app = match CodeExport::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&cli, &app);
    }

    // Execute main export workflow
    let exit_code = match app.export(&cli.root) {
        Ok(report) => {
            app.output_formatter().print_export_report(&report);

            if report.failures.is_empty() {
                0 // Success
            } else {
                2 // Success with per-file failures
            }
        }
        Err(e) => {
            app.handle_error(&e);

            // Map error types to appropriate exit codes
            match e {
                ExportError::Cancelled => 130, // Interrupted (SIGINT)
                ExportError::InvalidRoot { .. } => 3,
                ExportError::NoSourcesFound { .. } => 6,
                ExportError::Permission { .. } => 7,
                ExportError::Setup { .. } => 8,
                _ => 1, // General error
            }
        }
    };

    if cli.pause {
        wait_for_enter();
    }

    exit_code
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "codexport.toml".to_string());

    match CodeExport::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  codexport <root-directory> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, app: &CodeExport) -> i32 {
    let formatter = app.output_formatter();

    formatter.info("DRY RUN MODE - No files will be exported");
    formatter.print_separator();

    formatter.info("Configuration that would be used:");
    let config = app.config();

    println!("  Extensions: {}", config.filters.extensions.join(", "));
    println!("  Max file size: {} bytes", config.filters.max_file_size);
    println!(
        "  Exclude directories: {}",
        config.filters.exclude_dirs.join(", ")
    );
    println!("  Layout: {}", config.output.layout);
    println!(
        "  Base directory: {}",
        config.output.base_directory.display()
    );
    println!("  Generate report: {}", config.output.generate_report);

    formatter.print_separator();

    formatter.info("Export plan:");
    println!("  Source root: {}", cli.root.display());
    println!(
        "  Output directory: {}",
        config
            .output
            .base_directory
            .join(config.output.layout.export_dir_name())
            .display()
    );

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the actual export");

    0
}

fn print_startup_error(error: &ExportError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn wait_for_enter() {
    println!("Press Enter to exit");
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use codexport::{Config, LayoutChoice, OutputFormat};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cli_for(root: PathBuf) -> Cli {
        Cli {
            root,
            layout: None,
            output_base: None,
            formats: None,
            exclude: None,
            max_size: None,
            config: None,
            output_format: OutputFormat::Plain,
            no_report: false,
            verbose: 0,
            quiet: true,
            dry_run: false,
            generate_config: false,
            pause: false,
        }
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut cli = cli_for(temp_dir.path().to_path_buf());
        cli.config = Some(config_path.clone());
        cli.generate_config = true;

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[filters]"));
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();

        let mut cli = cli_for(temp_dir.path().to_path_buf());
        cli.dry_run = true;
        cli.layout = Some(LayoutChoice::Flat);

        let config = Config::default();
        let app = CodeExport::new_for_test(config, OutputMode::Plain, 0, true);

        let exit_code = handle_dry_run(&cli, &app);
        assert_eq!(exit_code, 0);
    }
}
