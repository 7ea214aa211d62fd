use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use super::rules::TrendAlignment;

#[derive(Parser, Debug)]
#[command(name = "trade-checklist", version, long_about = None)]
#[command(about = "Walks through the trade execution checklist and decides if a trade is permitted")]
pub struct ChecklistArgs {
    #[arg(long, value_enum, default_value_t = TrendAlignment::Yes, help = "Is the higher timeframe (HTF) trend aligned?")]
    pub trend: TrendAlignment,
    #[arg(long, help = "Economic calendar was checked for red folder news")]
    pub news: bool,
    #[arg(long, help = "Price reached HTF Point of Interest (POI)")]
    pub poi: bool,
    #[arg(long, help = "Lower timeframe (LTF) Change of Character (ChoCh)")]
    pub choch: bool,
    #[arg(long, help = "Fair Value Gap (FVG) or Order Block present")]
    pub imbalance: bool,
    #[arg(long, help = "RSI/Indicator divergence confirmed")]
    pub divergence: bool,
    #[arg(long, default_value_t = 0.5, help = "Risk % for this trade, from 0 to 2")]
    pub risk: f64,
    #[arg(long = "reward-ratio", default_value_t = 2., help = "Target Risk:Reward ratio, e.g. 3 for 1:3")]
    pub reward_ratio: f64,
    #[arg(long, help = "Print the verdict as json")]
    pub json: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    pub dir: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}
