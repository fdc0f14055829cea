//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Newsfactor - crawl financial news, score its impact and save it as CSV
#[derive(Parser)]
#[command(name = "newsfactor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "NEWSFACTOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl a listing page, score every record and save both snapshots
    Run(RunArgs),

    /// Crawl a listing page and save the raw news records
    Crawl(CrawlArgs),

    /// Talk to the news assistant, optionally launching a run
    Assistant,

    /// Plain chat, saving a transcript on exit
    Chat,

    /// Draft a document with the writing assistant
    Draft,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Listing page to crawl
    #[arg(short, long)]
    pub url: Option<String>,

    /// Let the chat model pick a listing page for this request
    #[arg(short, long, conflicts_with = "url")]
    pub query: Option<String>,

    /// Factor CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Raw news CSV path
    #[arg(long)]
    pub news_output: Option<PathBuf>,
}

/// Arguments for the crawl command
#[derive(Args)]
pub struct CrawlArgs {
    /// Listing page to crawl
    #[arg(short, long)]
    pub url: Option<String>,

    /// News CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Drop records missing any field
    #[arg(long)]
    pub strict: bool,

    /// Keep only links on the article path
    #[arg(long)]
    pub article_links: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration
    Validate,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "newsfactor",
            "-vv",
            "run",
            "--url",
            "https://kuaixun.eastmoney.com/ssgs.html",
            "--news-output",
            "raw.csv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.url.as_deref(), Some("https://kuaixun.eastmoney.com/ssgs.html"));
        assert_eq!(args.news_output, Some(PathBuf::from("raw.csv")));
        assert!(args.output.is_none());
    }

    #[test]
    fn url_and_query_conflict() {
        let parsed = Cli::try_parse_from(["newsfactor", "run", "--url", "https://a.test", "--query", "news"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_config_subcommands() {
        let cli = Cli::try_parse_from(["newsfactor", "--config", "my.toml", "config", "init", "--force"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Init { force: true })));
    }
}
