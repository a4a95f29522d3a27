//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::png_chart::PngChartRenderer;
use crate::domain::error::{ConfigError, LoadError, StockviewError};
use crate::domain::row_store::RowStore;
use crate::domain::settings::AppSettings;
use crate::domain::snapshot::Snapshot;
use crate::domain::summary::SummaryStats;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "stockview", about = "Historical stock data tables, charts and JSON")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Every command accepts `--data` to override `[data] path` from the config.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Print summary statistics as JSON
    Summary {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Print per-era record counts and monthly average volume
    Eras {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Render both charts to PNG files
    Charts {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Serve { config, data } => run_serve(config.as_deref(), data.as_deref()),
        Command::Summary { config, data } => run_summary(config.as_deref(), data.as_deref()),
        Command::Eras { config, data } => run_eras(config.as_deref(), data.as_deref()),
        Command::Charts {
            config,
            data,
            output,
        } => run_charts(config.as_deref(), data.as_deref(), &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_settings(config_path: Option<&Path>) -> Result<AppSettings, StockviewError> {
    let adapter = match config_path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)?
        }
        None => FileConfigAdapter::empty(),
    };
    Ok(AppSettings::from_config(&adapter)?)
}

fn resolve_data_path(
    data_override: Option<&Path>,
    settings: &AppSettings,
) -> Result<PathBuf, StockviewError> {
    data_override
        .map(Path::to_path_buf)
        .or_else(|| settings.data_path.clone())
        .ok_or_else(|| {
            ConfigError::Missing {
                section: "data".to_string(),
                key: "path".to_string(),
            }
            .into()
        })
}

pub fn load_store(port: &dyn DataPort) -> Result<RowStore, StockviewError> {
    let rows = port.fetch_rows()?;
    let store = RowStore::load(rows)?;
    info!(source = %port.source_name(), records = store.len(), "dataset loaded");
    Ok(store)
}

/// Loads settings and data, then runs the one-time startup computation.
pub fn prepare(
    config_path: Option<&Path>,
    data_override: Option<&Path>,
) -> Result<(AppSettings, Snapshot), StockviewError> {
    let settings = load_settings(config_path)?;
    let data_path = resolve_data_path(data_override, &settings)?;
    let store = load_store(&CsvAdapter::new(data_path))?;
    let renderer = PngChartRenderer::new(settings.chart);
    let snapshot = Snapshot::build(store, settings.analysis.clone(), &renderer)?;
    Ok((settings, snapshot))
}

fn run_summary(config_path: Option<&Path>, data: Option<&Path>) -> Result<(), StockviewError> {
    let settings = load_settings(config_path)?;
    let data_path = resolve_data_path(data, &settings)?;
    let store = load_store(&CsvAdapter::new(data_path))?;
    let summary = SummaryStats::compute(store.records()).ok_or(LoadError::Empty)?;
    let json = serde_json::to_string_pretty(&summary.view()).map_err(|e| StockviewError::Data {
        reason: format!("failed to encode summary: {e}"),
    })?;
    println!("{json}");
    Ok(())
}

fn run_eras(config_path: Option<&Path>, data: Option<&Path>) -> Result<(), StockviewError> {
    let (_, snapshot) = prepare(config_path, data)?;

    for era in &snapshot.eras {
        println!("{} ({} records)", era.label, era.record_count);
        let months: Vec<String> = era
            .monthly_volume
            .months
            .iter()
            .map(|m| format!("{} {:.0}", m.label, m.average_volume))
            .collect();
        println!("  volume: {}", months.join(", "));
        match &era.annual {
            Ok(series) => {
                for p in &series.points {
                    println!(
                        "  {} mean {:.2} ma{} {:.2}",
                        p.year, p.mean_price, series.window, p.moving_average
                    );
                }
            }
            Err(e) => println!("  annual averages unavailable: {e}"),
        }
    }
    Ok(())
}

fn run_charts(
    config_path: Option<&Path>,
    data: Option<&Path>,
    output: &Path,
) -> Result<(), StockviewError> {
    let (_, snapshot) = prepare(config_path, data)?;
    fs::create_dir_all(output)?;

    let charts = [
        ("monthly-volume.png", &snapshot.monthly_volume_chart),
        ("annual-ma.png", &snapshot.annual_ma_chart),
    ];
    let mut first_error = None;
    for (name, chart) in charts {
        match chart {
            Ok(image) => {
                let path = output.join(name);
                fs::write(&path, &image.png)?;
                info!(path = %path.display(), bytes = image.png.len(), "chart written");
            }
            Err(e) => {
                error!(chart = name, error = %e, "chart not written");
                first_error.get_or_insert_with(|| e.clone());
            }
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn run_serve(config_path: Option<&Path>, data: Option<&Path>) -> Result<(), StockviewError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};
        use std::sync::Arc;

        let (settings, snapshot) = prepare(config_path, data)?;
        let state = AppState {
            snapshot: Arc::new(snapshot),
        };
        let router = build_router(state);
        let addr = settings.listen;

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "starting web server");
            axum::serve(listener, router).await?;
            Ok::<(), std::io::Error>(())
        })?;
        Ok(())
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, data);
        Err(StockviewError::Config(ConfigError::Invalid {
            section: "web".to_string(),
            key: "listen".to_string(),
            reason: "built without the web feature".to_string(),
        }))
    }
}
