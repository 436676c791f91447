//! Command-line interface definitions.
//!
//! Defines all CLI arguments using clap.

use clap::Parser;
use std::path::PathBuf;

/// Slidedown presentation builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input markdown file with the presentation
    pub input: PathBuf,

    /// Output directory (relative to the input file)
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Generate a presenter view, optionally naming its output file
    /// or directory
    #[arg(long, num_args = 0..=1, default_missing_value = "presenter.html")]
    pub presenter: Option<String>,

    /// Template directory (default: bundled templates)
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose debug output
    #[arg(long)]
    pub debug: bool,

    /// Rebuild when the input or its referenced files change
    #[arg(long)]
    pub autoreload: bool,

    /// Serve the output via a webserver
    #[arg(long)]
    pub serve: bool,

    /// Port for the webserver
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::parse_from(["slidedown", "talk.md"]);
        assert_eq!(cli.input, PathBuf::from("talk.md"));
        assert_eq!(cli.output, PathBuf::from("output"));
        assert_eq!(cli.presenter, None);
        assert_eq!(cli.port, 8000);
        assert!(!cli.autoreload);
        assert!(!cli.serve);
    }

    #[test]
    fn test_presenter_bare_flag_defaults() {
        let cli = Cli::parse_from(["slidedown", "talk.md", "--presenter"]);
        assert_eq!(cli.presenter.as_deref(), Some("presenter.html"));
    }

    #[test]
    fn test_presenter_with_value() {
        let cli = Cli::parse_from(["slidedown", "talk.md", "--presenter", "notes"]);
        assert_eq!(cli.presenter.as_deref(), Some("notes"));
    }

    #[test]
    fn test_serve_options() {
        let cli = Cli::parse_from(["slidedown", "talk.md", "--serve", "--autoreload", "-p", "9001"]);
        assert!(cli.serve);
        assert!(cli.autoreload);
        assert_eq!(cli.port, 9001);
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["slidedown"]).is_err());
    }
}
