use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{
  cli::Cli,
  error::Error,
  utils::{PROJECT_NAME, get_config_dir, get_data_dir},
};

const CONFIG_FILE: &str = "config.json5";

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Strings {
  pub info: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
  #[serde(default)]
  pub data_dir: PathBuf,
  #[serde(default)]
  pub config_dir: PathBuf,
  pub sort_alphabetically: bool,
  #[serde(default)]
  pub items_file: Option<PathBuf>,
  pub strings: Strings,
  pub tick_rate: f64,
  pub frame_rate: f64,
}

impl Config {
  pub fn new() -> Result<Self, Error> {
    Self::load(&get_config_dir(), &get_data_dir())
  }

  /// Layers the built-in defaults, `config.json5` from `config_dir` and the
  /// `SETTINGS_LIST_*` environment, in that order.
  pub fn load(config_dir: &Path, data_dir: &Path) -> Result<Self, Error> {
    let config_path = config_dir.join(CONFIG_FILE);
    debug!("Reading configuration from {}", config_path.display());
    let builder = config::Config::builder()
      .set_default("data_dir", data_dir.to_string_lossy().to_string())?
      .set_default("config_dir", config_dir.to_string_lossy().to_string())?
      .set_default("sort_alphabetically", true)?
      .set_default("strings.info", "Info")?
      .set_default("tick_rate", 4.0)?
      .set_default("frame_rate", 30.0)?
      .add_source(config::File::from(config_path).format(config::FileFormat::Json5).required(false))
      .add_source(
        config::Environment::with_prefix(&PROJECT_NAME).prefix_separator("_").separator("__").try_parsing(true),
      );

    Ok(builder.build()?.try_deserialize()?)
  }

  /// Command line flags win over every configuration source.
  pub fn apply_cli(mut self, cli: &Cli) -> Self {
    if let Some(items) = &cli.items {
      self.items_file = Some(items.clone());
    }
    if cli.no_sort {
      self.sort_alphabetically = false;
    }
    if let Some(tick_rate) = cli.tick_rate {
      self.tick_rate = tick_rate;
    }
    if let Some(frame_rate) = cli.frame_rate {
      self.frame_rate = frame_rate;
    }
    self
  }
}
