use std::path::PathBuf;

/// Property approval CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "aprova", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a loan request for a property address
    Evaluate(EvaluateArgs),

    /// Download census-sector shapefiles for a state
    FetchData(FetchDataArgs),
}

#[derive(clap::Args, Debug)]
pub struct EvaluateArgs {
    /// Loan size in BRL (5000 - 200000)
    #[arg(long, default_value_t = 7_000.0)]
    pub loan_size: f64,

    /// Property street address, e.g. "R. Itapeva, 636 - Bela Vista"
    #[arg(long)]
    pub address: String,

    /// Property municipality
    #[arg(long, default_value = "São Paulo")]
    pub municipality: String,

    /// State / metropolitan region (selects the sector polygon set)
    #[arg(long, default_value = "São Paulo")]
    pub region: String,

    /// Root directory of per-state sector shapefiles
    #[arg(long, value_hint = clap::ValueHint::DirPath, default_value = "data/sectors")]
    pub data_dir: PathBuf,

    /// Trained model artifact (JSON)
    #[arg(long, value_hint = clap::ValueHint::FilePath, default_value = "data/acceptance_model.json")]
    pub model: PathBuf,

    /// Feature-schema artifact (JSON array of column names)
    #[arg(long, value_hint = clap::ValueHint::FilePath, default_value = "data/var_names.json")]
    pub schema: PathBuf,

    /// Override the census webhook base URL
    #[arg(long)]
    pub census_url: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct FetchDataArgs {
    /// State name or two-letter code, e.g. "São Paulo", SP, df
    pub state: String,

    /// Polygon root to download into, defaults to "data/sectors"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Overwrite an already-downloaded archive
    #[arg(long)]
    pub force: bool,
}
