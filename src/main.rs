//! CLI entry point for jamf-search.
//!
//! Authenticates with a bearer token, downloads every script and policy
//! from a Jamf Pro server into `--output`, and prints where `--keyword`
//! occurs.
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (auth failure, HTTP error, malformed listing, I/O)
//! - 2: argument validation error (clap handles this automatically)

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jamf_search::pipeline::{SearchJob, run};
use jamf_search::search::SearchOptions;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the Jamf Pro server (e.g. https://jamf.example.com).
    #[arg(long)]
    url: String,

    /// Jamf Pro API username.
    #[arg(long, env = "JAMF_USER")]
    user: String,

    /// Jamf Pro API password. Prefer the JAMF_PASSWORD environment variable
    /// to keep it out of shell history and process listings.
    #[arg(long, env = "JAMF_PASSWORD", hide_env_values = true)]
    password: String,

    /// Keyword to search for in script contents and policy script sections.
    #[arg(long)]
    keyword: String,

    /// Match the keyword case-sensitively (default: case-insensitive).
    #[arg(long)]
    case_sensitive: bool,

    /// Directory to save downloaded XML files in.
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    // Logs go to stderr so stdout carries only the match report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jamf_search=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let job = SearchJob {
        base_url: args.url,
        user: args.user,
        password: args.password,
        options: SearchOptions::new(&args.keyword, args.case_sensitive),
        output_dir: args.output,
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = run(&job, &mut stdout).await {
        eprintln!("Error: {e}");
        let mut cause = e.source();
        while let Some(inner) = cause {
            eprintln!("  caused by: {inner}");
            cause = inner.source();
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Arguments that satisfy every required flag.
    fn base_args() -> Vec<&'static str> {
        vec![
            "jamf-search",
            "--url",
            "https://jamf.example.com",
            "--user",
            "api-reader",
            "--password",
            "s3cret",
            "--keyword",
            "curl",
        ]
    }

    #[test]
    fn valid_args_parse_with_defaults() {
        let cli = Cli::try_parse_from(base_args()).expect("should parse required flags");
        assert_eq!(cli.url, "https://jamf.example.com");
        assert_eq!(cli.user, "api-reader");
        assert_eq!(cli.password, "s3cret");
        assert_eq!(cli.keyword, "curl");
        assert!(!cli.case_sensitive, "case-insensitive by default");
        assert_eq!(cli.output, PathBuf::from("output"));
    }

    #[test]
    fn case_sensitive_flag_and_output_override() {
        let mut args = base_args();
        args.extend_from_slice(&["--case-sensitive", "--output", "/tmp/jamf"]);
        let cli = Cli::try_parse_from(args).expect("should parse optional flags");
        assert!(cli.case_sensitive);
        assert_eq!(cli.output, PathBuf::from("/tmp/jamf"));
    }

    #[test]
    fn missing_keyword_is_rejected() {
        let args: Vec<&str> = base_args().into_iter().take(7).collect();
        assert!(
            Cli::try_parse_from(args).is_err(),
            "parsing should fail without --keyword"
        );
    }

    #[test]
    fn missing_url_is_rejected() {
        let args: Vec<&str> = base_args()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != 1 && *i != 2)
            .map(|(_, a)| a)
            .collect();
        assert!(Cli::try_parse_from(args).is_err());
    }
}
