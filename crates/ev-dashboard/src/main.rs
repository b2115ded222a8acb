mod bootstrap;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use ev_core::error::DashboardError;
use ev_core::settings::Settings;
use ev_data::analysis::DashboardReport;
use ev_runtime::data_manager::{load_shared, DataManager, SharedDataManager};
use ev_runtime::loader::DataLoader;
use ev_runtime::server;
use ev_runtime::source::{CsvFileSource, DataSource, HttpSource};
use ev_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::ensure_directories()?;
    let destination =
        bootstrap::log_destination(&settings.view, settings.log_file.as_deref(), &app_dir);
    bootstrap::setup_logging(
        &bootstrap::filter_directive(&settings.log_level, settings.debug),
        destination.as_deref(),
    )?;

    tracing::info!("EV Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Top makes: {}",
        settings.view,
        settings.theme,
        settings.top_makes
    );

    let source = select_source(&settings)?;
    let description = source.describe();
    tracing::info!("Data source: {description}");
    let manager = DataManager::new(source, settings.cache_ttl).shared();

    match settings.view.as_str() {
        "dashboard" => {
            tracing::info!("Starting terminal dashboard...");

            let (rx, handle) = DataLoader::new(manager).start();
            let app = App::new(
                &settings.theme,
                description,
                settings.criteria(),
                settings.top_makes as usize,
            );

            // The TUI exits on 'q' / Ctrl+C itself; the signal arm covers
            // signals delivered while the terminal is not in raw mode.
            tokio::select! {
                result = app.run(rx, handle) => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        "summary" => {
            let result = load_shared(&manager, false).await?;
            let report =
                DashboardReport::build(&result, &settings.criteria(), settings.top_makes as usize);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        "serve" => {
            let addr = resolve_addr(&settings.host, settings.port).await?;
            serve(manager, addr).await?;
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// `--data-url` wins over `--data-file`; with neither, the dataset is
/// discovered from the standard locations.
fn select_source(settings: &Settings) -> Result<Box<dyn DataSource>, DashboardError> {
    if let Some(url) = &settings.data_url {
        return Ok(Box::new(HttpSource::new(url.clone())));
    }
    let path = match &settings.data_file {
        Some(path) => path.clone(),
        None => bootstrap::discover_data_path().ok_or_else(|| {
            DashboardError::DataPathNotFound(bootstrap::DATA_FILE_NAME.into())
        })?,
    };
    Ok(Box::new(CsvFileSource::new(path)))
}

async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("resolving {host}:{port}"))?
        .next()
        .with_context(|| format!("no address for {host}:{port}"))
}

async fn serve(manager: SharedDataManager, addr: SocketAddr) -> Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Ctrl+C received; stopping HTTP service");
    };
    server::serve(manager, addr, shutdown).await?;
    Ok(())
}
