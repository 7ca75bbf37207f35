//! Command line arguments.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "skylight")]
#[command(about = "A web page in a floating overlay, one hotkey away")]
#[command(version)]
pub struct Cli {
    /// Install skylight to run at login, then exit
    #[arg(long)]
    pub install_startup: bool,

    /// Remove the login item, then exit
    #[arg(long, conflicts_with = "install_startup")]
    pub uninstall_startup: bool,
}
