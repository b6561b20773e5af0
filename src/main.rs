use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

use crate::{
  app::App,
  cli::Cli,
  config::Config,
  settings::loader::{default_items, load_items},
  utils::{initialize_logging, initialize_panic_handler},
};

pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod mode;
pub mod settings;
pub mod tui;
pub mod utils;

async fn tokio_main() -> Result<()> {
  initialize_logging()?;
  initialize_panic_handler()?;

  let cli = Cli::parse();
  let config = Config::new()?.apply_cli(&cli);
  let items = match &config.items_file {
    Some(path) => load_items(path)?,
    None => {
      info!("No items file configured, showing the bundled settings");
      default_items()?
    },
  };

  let mut app = App::new(config, items)?;
  app.run().await?;

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  if let Err(e) = tokio_main().await {
    eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
    Err(e)
  } else {
    Ok(())
  }
}
