use anyhow::Result;

use delegant_core::settings::ProviderKind;
use delegant_core::window::DisplayMetrics;
use delegant_infrastructure::DelegantPaths;

use super::utils::workspace;

pub async fn run(paths: &DelegantPaths, provider: Option<ProviderKind>) -> Result<()> {
    let ws = workspace(paths, DisplayMetrics::FALLBACK)?;
    ws.ctx.settings.load().await;

    let mut settings = ws.ctx.settings.settings();
    if let Some(provider) = provider {
        settings.provider = provider;
    }
    let request = settings.catalog_request();

    let mut view = delegant_application::CatalogView::new(request.provider);
    let ticket = view.begin(request.clone());
    let outcome = ws.ctx.catalog.resolve(&request).await;
    view.complete(ticket, outcome);

    if let Some(hint) = view.hint("") {
        eprintln!("{}", hint);
        let fallback = request.provider.profile().static_catalog();
        if !fallback.is_empty() {
            eprintln!("Built-in {} models:", request.provider.profile().label);
            for model in fallback {
                println!("{}\t{}", model.id, model.label);
            }
        }
        return Ok(());
    }

    for model in view.models() {
        let marker = if model.id == settings.model { "*" } else { " " };
        println!("{} {}\t{}", marker, model.id, model.label);
    }
    Ok(())
}
