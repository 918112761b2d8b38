use crate::config::Scope;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// OCR documents using a PaddleOCR layout-parsing server
#[derive(Parser, Debug)]
#[command(
    name = "paddleocr-cli",
    version,
    about,
    args_conflicts_with_subcommands = true,
    after_help = "Examples:
  paddleocr-cli resume.pdf                    # OCR and print to stdout
  paddleocr-cli resume.pdf -o output.md       # OCR and save to file
  paddleocr-cli resume.pdf --json             # Output as JSON
  paddleocr-cli configure                     # Configure credentials
  paddleocr-cli configure --show              # Show current config
  paddleocr-cli configure --test              # Test connection"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub ocr: OcrArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configure or view PaddleOCR credentials
    Configure(ConfigureArgs),
}

#[derive(Args, Debug, Default)]
pub struct OcrArgs {
    /// Path to the PDF or image to OCR
    pub input: Option<PathBuf>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output as JSON instead of markdown
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Extract only page N (0-indexed)
    #[arg(long, value_name = "N")]
    pub page: Option<usize>,

    /// Don't add page separators in markdown output
    #[arg(long, default_value_t = false)]
    pub no_separator: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,

    /// Enable document orientation classification
    #[arg(long, default_value_t = false)]
    pub orientation: bool,

    /// Enable document unwarping
    #[arg(long, default_value_t = false)]
    pub unwarp: bool,

    /// Enable chart recognition
    #[arg(long, default_value_t = false)]
    pub chart: bool,

    /// Suppress progress messages
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ConfigureArgs {
    /// Set the server URL
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Set the access token
    #[arg(long)]
    pub token: Option<String>,

    /// Where to save: user (~/.config/paddleocr_cli/), project (alongside .claude/), or local (current directory)
    #[arg(short, long, value_enum, default_value_t = Scope::User)]
    pub scope: Scope,

    /// Show current configuration
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Test connection to the server
    #[arg(long, default_value_t = false)]
    pub test: bool,

    /// Show config file search locations
    #[arg(long, default_value_t = false)]
    pub locations: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ocr_flags() {
        let cli = Cli::parse_from([
            "paddleocr-cli",
            "scan.pdf",
            "-o",
            "out.md",
            "--page",
            "2",
            "--timeout",
            "30",
            "--chart",
            "-q",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.ocr.input, Some(PathBuf::from("scan.pdf")));
        assert_eq!(cli.ocr.output, Some(PathBuf::from("out.md")));
        assert_eq!(cli.ocr.page, Some(2));
        assert_eq!(cli.ocr.timeout, 30);
        assert!(cli.ocr.chart);
        assert!(cli.ocr.quiet);
        assert!(!cli.ocr.json);
    }

    #[test]
    fn parses_configure_subcommand() {
        let cli = Cli::parse_from([
            "paddleocr-cli",
            "configure",
            "--server-url",
            "https://ocr.example.com",
            "--token",
            "abc",
            "-s",
            "project",
        ]);
        match cli.command {
            Some(Command::Configure(args)) => {
                assert_eq!(args.server_url.as_deref(), Some("https://ocr.example.com"));
                assert_eq!(args.token.as_deref(), Some("abc"));
                assert_eq!(args.scope, Scope::Project);
            }
            other => panic!("expected configure, got {:?}", other),
        }
    }

    #[test]
    fn scope_defaults_to_user() {
        let cli = Cli::parse_from(["paddleocr-cli", "configure", "--show"]);
        match cli.command {
            Some(Command::Configure(args)) => {
                assert_eq!(args.scope, Scope::User);
                assert!(args.show);
            }
            other => panic!("expected configure, got {:?}", other),
        }
    }
}
