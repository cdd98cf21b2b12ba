use anyhow::Result;
use clap::Args;

use delegant_core::settings::{ProviderKind, SettingsPatch};
use delegant_core::window::DisplayMetrics;
use delegant_infrastructure::DelegantPaths;

use super::utils::{Resolution, masked_settings, print_json, workspace};

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Provider to select; also selects its first built-in model
    #[arg(long)]
    provider: Option<ProviderKind>,
    /// Credential for the selected provider
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// Local model server address
    #[arg(long)]
    endpoint: Option<String>,
    /// Agent screen size, e.g. 1280x800
    #[arg(long)]
    display: Option<Resolution>,
    /// Shell command timeout in seconds
    #[arg(long)]
    shell_timeout: Option<u64>,
}

impl SetArgs {
    fn into_patch(self, provider: ProviderKind) -> SettingsPatch {
        let mut patch = match self.api_key {
            Some(key) => SettingsPatch::credential(provider, key),
            None => SettingsPatch::default(),
        };
        patch.model = self.model;
        patch.ollama_base_url = self.endpoint;
        patch.display_width = self.display.map(|d| d.width);
        patch.display_height = self.display.map(|d| d.height);
        patch.shell_timeout_secs = self.shell_timeout;
        patch
    }
}

pub async fn show(paths: &DelegantPaths) -> Result<()> {
    let ws = workspace(paths, DisplayMetrics::FALLBACK)?;
    ws.ctx.settings.load().await;
    print_json(&masked_settings(&ws.ctx.settings.settings())?)
}

pub async fn set(paths: &DelegantPaths, args: SetArgs) -> Result<()> {
    let ws = workspace(paths, DisplayMetrics::FALLBACK)?;
    let store = &ws.ctx.settings;
    store.load().await;

    if let Some(provider) = args.provider {
        store.select_provider(provider);
    }
    let patch = args.into_patch(store.settings().provider);
    if !patch.is_empty() {
        store.update(patch);
    }
    store.save().await;

    print_json(&masked_settings(&store.settings())?)
}

pub async fn reset_wizard(paths: &DelegantPaths) -> Result<()> {
    let ws = workspace(paths, DisplayMetrics::FALLBACK)?;
    ws.ctx.settings.load().await;
    ws.ctx.settings.reset_wizard().await?;
    println!("Setup wizard will run on next launch.");
    Ok(())
}
