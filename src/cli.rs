use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "storefront-ui")]
#[command(about = "Drive storefront cart and backup/restore actions from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Cookie header to send; the CSRF token is read from it
    #[arg(long, global = true, env = "STOREFRONT_COOKIE")]
    pub cookie: Option<String>,

    /// Storefront origin, overriding config.toml and the environment
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file (default: ./config.toml when present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove one item from the cart
    RemoveItem {
        /// Item slug (also the cart row's element id)
        slug: String,

        /// Counter value shown before removal
        #[arg(long, default_value = "1")]
        items_in_cart: String,
    },
    /// Back up to cloud storage
    Backup,
    /// Restore from cloud storage
    Restore,
}
