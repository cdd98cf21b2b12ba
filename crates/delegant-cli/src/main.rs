use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use delegant_core::settings::ProviderKind;
use delegant_infrastructure::DelegantPaths;

mod commands;
mod logging;

use commands::utils::Resolution;

#[derive(Parser)]
#[command(name = "delegant")]
#[command(about = "Delegant - desktop agent front-end state tools", long_about = None)]
struct Cli {
    /// Configuration directory (defaults to $DELEGANT_HOME, then the platform config dir)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// List the models available for a provider
    Models {
        /// Provider to query (defaults to the selected one)
        #[arg(long)]
        provider: Option<ProviderKind>,
    },
    /// Print the window geometry of every layout
    Layout {
        /// Display size in physical pixels, e.g. 2560x1440
        #[arg(long)]
        display: Option<Resolution>,
        /// Display scale factor
        #[arg(long)]
        scale: Option<f64>,
    },
    /// Feed recorded backend events through the event bridge
    Replay {
        /// JSON Lines file, one `{"topic": ..., "payload": ...}` per line
        events: PathBuf,
        /// Submit this task before replaying
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        display: Option<Resolution>,
        #[arg(long)]
        scale: Option<f64>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print settings with credentials masked
    Show,
    /// Update settings and save them
    Set(commands::settings::SetArgs),
    /// Reopen the setup wizard on next launch
    ResetWizard,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = DelegantPaths::new(cli.home.clone());

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let logs_dir = paths.logs_dir().ok();
    let _guard = logging::init(logs_dir.as_deref(), default_filter);

    match cli.command {
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show(&paths).await?,
            SettingsAction::Set(args) => commands::settings::set(&paths, args).await?,
            SettingsAction::ResetWizard => commands::settings::reset_wizard(&paths).await?,
        },
        Commands::Models { provider } => commands::models::run(&paths, provider).await?,
        Commands::Layout { display, scale } => commands::layout::run(display, scale)?,
        Commands::Replay {
            events,
            task,
            display,
            scale,
        } => commands::replay::run(&paths, &events, task.as_deref(), display, scale).await?,
    }

    Ok(())
}
