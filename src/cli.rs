use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "optin-modal",
    version,
    about = "Phone/email opt-in consent dialog for the terminal"
)]
pub struct Args {
    /// Open the opt-in dialog right away
    #[arg(short, long)]
    pub open: bool,

    /// Config file to use instead of the one in the platform config dir
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Theme name (e.g., "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,
}
