use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kisaan", version, about = "Crop advisory TUI for Indian farmers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config, load the crop catalog and test connections
    Check,
    /// Print crop suggestions for a location
    Suggest(SuggestArgs),
    /// Search for an Indian place by name
    Search {
        /// Place name, e.g. "Nashik"
        query: String,
    },
    /// List recently used locations
    Locations {
        /// Forget all recent locations
        #[arg(long)]
        clear: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct SuggestArgs {
    /// Latitude (defaults to the configured location)
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude (defaults to the configured location)
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Month 1-12 to plan for (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Use mock weather regardless of configuration
    #[arg(long)]
    pub mock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn suggest_parses_coordinates() {
        let cli = Cli::parse_from([
            "kisaan", "suggest", "--lat", "18.52", "--lon", "73.86", "--month", "7", "--json",
        ]);
        match cli.command {
            Some(Commands::Suggest(args)) => {
                assert_eq!(args.lat, Some(18.52));
                assert_eq!(args.month, Some(7));
                assert!(args.json);
                assert!(!args.mock);
            }
            _ => panic!("expected suggest"),
        }
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["kisaan", "suggest", "--month", "13"]).is_err());
        assert!(Cli::try_parse_from(["kisaan", "suggest", "--lat", "18.5"]).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["kisaan", "-vv", "locations"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Some(Commands::Locations { clear: false })
        ));

        let cli = Cli::parse_from(["kisaan", "locations", "--clear"]);
        assert!(matches!(cli.command, Some(Commands::Locations { clear: true })));
    }
}
