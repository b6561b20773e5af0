use std::path::PathBuf;

use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  /// JSON5 file with the settings entries to show
  #[arg(short, long, value_name = "FILE")]
  pub items: Option<PathBuf>,

  /// Keep entries in key order instead of sorting them by label
  #[arg(long)]
  pub no_sort: bool,

  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second")]
  pub tick_rate: Option<f64>,

  #[arg(short, long, value_name = "FLOAT", help = "Frame rate, i.e. number of frames per second")]
  pub frame_rate: Option<f64>,
}
