use ai_energy_map::app::View;
use ai_energy_map::metric::Metric;
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for ai-energy-map
#[derive(Debug, Parser)]
#[command(
    name = "ai-energy-map",
    version,
    about = "Terminal map and chart of AI task energy use and environmental impact"
)]
pub struct CliArgs {
    /// Directory holding world_countries.json and the two CSV tables
    #[arg(short = 'd', long = "data-dir", default_value = "data")]
    pub data_dir: PathBuf,

    /// Region aliases, aggregates and color scales (JSON). Uses the built-in table when omitted
    #[arg(short = 'r', long = "regions")]
    pub regions: Option<PathBuf>,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long = "log-file", default_value = "ai-energy-map.log")]
    pub log_file: PathBuf,

    /// Chart shown at startup
    #[arg(long, value_enum, default_value_t = View::Map)]
    pub view: View,

    /// Metric the map starts on
    #[arg(short = 'm', long, value_enum, default_value_t = Metric::Energy)]
    pub metric: Metric,
}
