use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::cmd::Commands;

/// Personal task dashboard backed by a JSON file.
/// Storage defaults to ~/.taskpulse/tasks.json, or a path passed via --db.
#[derive(Parser)]
#[command(name = "pulse", version, about = "Daily task focus, backlog and productivity analytics")]
pub struct Cli {
    /// Path to the JSON task store. Overrides `store.path` from configuration.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Treat this day (YYYY-MM-DD) as today.
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the change a write command would make without saving it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Defaults to `dashboard`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["pulse", "--today", "2024-06-10"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 6, 10));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["pulse", "toggle", "abc", "--dry-run", "--json"]).unwrap();
        assert!(cli.dry_run && cli.json);
        assert!(matches!(cli.command, Some(Commands::Toggle { ref id }) if id == "abc"));
    }
}
