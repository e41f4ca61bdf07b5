use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_ui::cli::{Cli, Command};
use storefront_ui::config::ClientConfig;
use storefront_ui::handlers::{BackupRestoreController, CartItemRemover};
use storefront_ui::page::RecordingPage;
use storefront_ui::transport::HttpTransport;
use storefront_ui::view::Modal;

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_ui=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  match run(Cli::parse()).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {e:#}");
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
  let mut config = match &cli.config {
    Some(path) => ClientConfig::from_sources(Some(path.as_path()), |key| std::env::var(key).ok())
      .with_context(|| format!("Loading {}", path.display()))?,
    None => ClientConfig::load().context("Loading configuration")?,
  };
  if let Some(base_url) = cli.base_url {
    config = config.with_base_url(base_url)?;
  }

  let cookie = cli
    .cookie
    .context("No cookie header given (use --cookie or STOREFRONT_COOKIE)")?;
  let transport = HttpTransport::from_cookie_header(&config, &cookie)?;

  let page = match &cli.command {
    Command::RemoveItem {
      slug,
      items_in_cart,
    } => {
      let page = Arc::new(Mutex::new(RecordingPage::cart(&[slug.as_str()], items_in_cart)));
      let remover = CartItemRemover::new(&config, transport, page.clone())?;
      let outcome = remover.remove(slug).await;
      println!("outcome: {:?}", outcome);
      page
    }
    Command::Backup => {
      let page = Arc::new(Mutex::new(RecordingPage::admin_with_spinner(Modal::Backup)));
      let controller = BackupRestoreController::new(&config, transport, page.clone());
      println!("outcome: {:?}", controller.backup().await);
      page
    }
    Command::Restore => {
      let page = Arc::new(Mutex::new(RecordingPage::admin_with_spinner(Modal::Restore)));
      let controller = BackupRestoreController::new(&config, transport, page.clone());
      println!("outcome: {:?}", controller.restore().await);
      page
    }
  };

  let page = page
    .lock()
    .map_err(|_| anyhow::anyhow!("Page state lock poisoned"))?;
  for op in page.ops() {
    println!("  {}", op);
  }
  Ok(())
}
