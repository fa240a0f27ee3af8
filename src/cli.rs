use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "kvscore",
    version,
    about = "Key-value extraction accuracy scoring against ground truth"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Score(ScoreArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub ground_truth: PathBuf,

    #[arg(long)]
    pub extracted: PathBuf,

    #[arg(long)]
    pub field_config: Option<PathBuf>,

    #[arg(long, default_value = "reports")]
    pub report_dir: PathBuf,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DateOrder::DayFirst)]
    pub date_order: DateOrder,

    #[arg(long, default_value_t = 0.5)]
    pub jaccard_threshold: f64,

    #[arg(long, default_value_t = 4)]
    pub identifier_overhang_max: usize,

    #[arg(long, default_value_t = false)]
    pub details: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
}

impl DateOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DayFirst => "day-first",
            Self::MonthFirst => "month-first",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "reports")]
    pub report_dir: PathBuf,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}
