use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{config, discover, list, metrics};
use media_shelf_config::PathManager;
use media_shelf_core::{RankingMode, SortKey};
use media_shelf_models::MediaType;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelshelf")]
#[command(about = "ReelShelf - Metrics, filters and recommendations for your movie notes")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write logs to the rotating log file in the config directory
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ranked metrics for the library
    #[command(long_about = "Aggregate the library into top-N lists per genre, actor, director, production company, collection and year, plus taste index, watch time and budget leaderboards. Watchlist entries are left out unless --include-watchlist is given.")]
    Metrics {
        #[command(flatten)]
        library: LibraryArgs,

        /// Ranking mode applied to every dimension
        #[arg(long, value_enum, default_value = "count")]
        mode: ModeArg,

        /// Count watchlist entries too
        #[arg(long, action = ArgAction::SetTrue)]
        include_watchlist: bool,

        /// Explain an actor's combined-score rank (implies --mode combined-score)
        #[arg(long, value_name = "ACTOR")]
        explain: Option<String>,
    },
    /// List the library with filters and sorting
    List {
        #[command(flatten)]
        library: LibraryArgs,

        /// Case-insensitive search over title, people, companies, collection, year and providers
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        /// Genre to filter by (repeatable)
        #[arg(long = "genre", value_name = "GENRE")]
        genres: Vec<String>,

        /// Require every selected genre instead of any
        #[arg(long, action = ArgAction::SetTrue)]
        all_genres: bool,

        /// Media type to keep (repeatable)
        #[arg(long = "type", value_enum, value_name = "TYPE")]
        types: Vec<TypeArg>,

        /// Minimum user rating (0-5)
        #[arg(long, value_name = "RATING")]
        min_rating: Option<f64>,

        /// Only watchlist entries
        #[arg(long, action = ArgAction::SetTrue)]
        watchlist: bool,

        /// Original language to keep (repeatable; defaults to the configured languages)
        #[arg(long = "language", value_name = "LANG")]
        languages: Vec<String>,

        /// Streaming provider to keep (repeatable)
        #[arg(long = "provider", value_name = "PROVIDER")]
        providers: Vec<String>,

        /// Sort key
        #[arg(long, value_enum, default_value = "rating")]
        sort: SortArg,

        /// Sort ascending instead of descending
        #[arg(long, action = ArgAction::SetTrue)]
        ascending: bool,

        /// Extra property columns (repeatable; defaults to the configured properties)
        #[arg(long = "property", value_name = "NAME")]
        properties: Vec<String>,

        /// Print the available filter values and properties instead of the list
        #[arg(long, action = ArgAction::SetTrue)]
        facets: bool,
    },
    /// Pick seed titles and rank recommendations from their similar items
    #[command(long_about = "Without --candidates, lists the titles that can be used as seeds for the chosen genres and type. With --candidates (a JSON object mapping each seed's external id to the similar items returned by the movie database), ranks the items suggested by the selected seeds.")]
    Discover {
        #[command(flatten)]
        library: LibraryArgs,

        /// Seed genre (repeatable)
        #[arg(long = "genre", value_name = "GENRE")]
        genres: Vec<String>,

        /// Require every selected genre instead of any
        #[arg(long, action = ArgAction::SetTrue)]
        all_genres: bool,

        /// Seed media type
        #[arg(long = "type", value_enum, default_value = "movie")]
        media_type: TypeArg,

        /// Candidate lists per seed external id
        #[arg(long, value_name = "FILE")]
        candidates: Option<PathBuf>,

        /// Toggle a seed by title (repeatable; defaults to every seed in the pool)
        #[arg(long = "seed", value_name = "TITLE")]
        seeds: Vec<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a configuration file with the default values
    Init {
        /// Overwrite an existing file without asking
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

#[derive(clap::Args)]
struct LibraryArgs {
    /// Library snapshot: JSON array of note frontmatter objects
    #[arg(long, value_name = "FILE")]
    library: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Count,
    SimpleRating,
    BalancedRating,
    AverageRating,
    BlockbusterCount,
    CombinedScore,
}

impl From<ModeArg> for RankingMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Count => RankingMode::Count,
            ModeArg::SimpleRating => RankingMode::SimpleRating,
            ModeArg::BalancedRating => RankingMode::BalancedRating,
            ModeArg::AverageRating => RankingMode::AverageRating,
            ModeArg::BlockbusterCount => RankingMode::BlockbusterCount,
            ModeArg::CombinedScore => RankingMode::CombinedScore,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Alphabetical,
    Rating,
    ExternalVote,
    HiddenGem,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Alphabetical => SortKey::Alphabetical,
            SortArg::Rating => SortKey::Rating,
            SortArg::ExternalVote => SortKey::ExternalVote,
            SortArg::HiddenGem => SortKey::HiddenGem,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeArg {
    Movie,
    Series,
}

impl From<TypeArg> for MediaType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Movie => MediaType::Movie,
            TypeArg::Series => MediaType::Series,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = if cli.log_to_file {
        Some(PathManager::default().log_file())
    } else {
        None
    };
    logging::init_logging(cli.verbose, cli.quiet, log_file.as_deref())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = cli.config.unwrap_or_else(|| PathManager::default().config_file());

    match cli.command {
        Commands::Metrics {
            library,
            mode,
            include_watchlist,
            explain,
        } => {
            let opts = metrics::MetricsOptions {
                mode: mode.into(),
                include_watchlist,
                explain,
            };
            metrics::run_metrics(&library.library, &config_path, opts, &output)
        }
        Commands::List {
            library,
            search,
            genres,
            all_genres,
            types,
            min_rating,
            watchlist,
            languages,
            providers,
            sort,
            ascending,
            properties,
            facets,
        } => {
            let opts = list::ListOptions {
                search,
                genres,
                all_genres,
                types: types.into_iter().map(MediaType::from).collect(),
                min_rating,
                watchlist,
                languages,
                providers,
                sort: sort.into(),
                ascending,
                properties,
                facets,
            };
            list::run_list(&library.library, &config_path, opts, &output)
        }
        Commands::Discover {
            library,
            genres,
            all_genres,
            media_type,
            candidates,
            seeds,
        } => {
            let opts = discover::DiscoverOptions {
                genres,
                all_genres,
                media_type: media_type.into(),
                candidates,
                seeds,
            };
            discover::run_discover(&library.library, opts, &output)
        }
        Commands::Config { cmd } => config::run_config(cmd, &config_path, &output),
    }
}
