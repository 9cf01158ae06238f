use catchcheck_core::models::{FishingMethod, VerificationStatus, WaterClarity};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Catchcheck - Catch submission and verification engine
#[derive(Parser, Debug)]
#[command(name = "catchcheck")]
#[command(
    about = "Resolve fishing grounds, analyze catch photos, and verify submissions",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./catchcheck.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON file holding stored catches
    #[arg(long, global = true, value_name = "FILE", default_value = "catches.json")]
    pub store: PathBuf,

    /// Override the analysis model
    #[arg(long, global = true)]
    pub oracle_model: Option<String>,

    /// Override the analysis service base URL
    #[arg(long, global = true)]
    pub oracle_url: Option<String>,

    /// Override the geolocation timeout in seconds
    #[arg(long, global = true)]
    pub location_timeout: Option<u64>,

    /// Override the maximum number of grounds returned by a search
    #[arg(long, global = true)]
    pub search_limit: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List fishing grounds nearest to a position
    Grounds(GroundsArgs),

    /// Analyze a catch photo without submitting it
    Analyze(AnalyzeArgs),

    /// Submit a catch
    Submit(SubmitArgs),

    /// Approve or reject a catch waiting for review
    Review(ReviewArgs),

    /// List stored catches
    List(ListArgs),

    /// Show effective configuration and where each value came from
    Config,
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    /// Latitude in degrees (WGS84)
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude in degrees (WGS84)
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct GroundsArgs {
    /// Ground catalog (JSON array or GeoJSON FeatureCollection)
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    #[command(flatten)]
    pub position: PositionArgs,

    /// Filter by ground name or id
    #[arg(long, short = 'q', default_value = "")]
    pub query: String,

    /// Also ask the analysis service for the nearest named ground
    #[arg(long)]
    pub suggest: bool,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Photo to analyze
    pub image: PathBuf,

    /// Run the health diagnostic instead of the species check
    #[arg(long)]
    pub health: bool,

    /// Evaluate the verdict as a competition entry
    #[arg(long)]
    pub competition: bool,
}

#[derive(Parser, Debug)]
pub struct SubmitArgs {
    /// Ground catalog (JSON array or GeoJSON FeatureCollection)
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Catch photo
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Species (overrides the species recognized from the photo)
    #[arg(long)]
    pub species: Option<String>,

    /// Length in centimetres
    #[arg(long)]
    pub length: Option<f64>,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,

    #[command(flatten)]
    pub position: PositionArgs,

    /// Catalog ground id
    #[arg(long, conflicts_with = "location")]
    pub ground: Option<String>,

    /// Free-text location name for grounds outside the catalog
    #[arg(long)]
    pub location: Option<String>,

    /// Hide the exact position from other anglers
    #[arg(long)]
    pub private: bool,

    #[arg(long, default_value = "")]
    pub bait: String,

    /// spinning, ledgering, feeder, float, fly or ice
    #[arg(long, default_value = "spinning")]
    pub method: FishingMethod,

    /// clear, semi-turbid, turbid, muddy or algae-bloom
    #[arg(long, default_value = "clear")]
    pub clarity: WaterClarity,

    /// Air temperature in °C
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f64>,

    /// Atmospheric pressure in hPa
    #[arg(long)]
    pub pressure: Option<f64>,

    /// Wind speed
    #[arg(long)]
    pub wind: Option<String>,

    /// Competition id; entries always go to manual review
    #[arg(long, value_name = "ID")]
    pub competition: Option<String>,

    /// Submitter id
    #[arg(long, default_value = "local")]
    pub user_id: String,

    /// Submitter display name
    #[arg(long, default_value = "Angler")]
    pub user_name: String,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("decision").required(true).args(["approve", "reject"])))]
pub struct ReviewArgs {
    /// Catch id
    pub id: String,

    #[arg(long)]
    pub approve: bool,

    #[arg(long)]
    pub reject: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show catches with this status
    #[arg(long)]
    pub status: Option<StatusFilter>,

    /// Only show catches by this submitter id
    #[arg(long)]
    pub user: Option<String>,
}

/// Verification status filter
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StatusFilter {
    Pending,
    Verified,
    Rejected,
}

impl From<StatusFilter> for VerificationStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Pending => VerificationStatus::Pending,
            StatusFilter::Verified => VerificationStatus::Verified,
            StatusFilter::Rejected => VerificationStatus::Rejected,
        }
    }
}
