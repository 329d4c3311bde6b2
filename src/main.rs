use std::process::ExitCode;
use std::time::Duration;

use balizas_v16_lib::core::config::AppConfig;
use balizas_v16_lib::core::export::to_geojson;
use balizas_v16_lib::core::feed::FeedClient;
use balizas_v16_lib::core::i18n::{translate, Language};
use balizas_v16_lib::core::report::{render_error, render_next_update, render_summary};
use balizas_v16_lib::core::storage::SettingsRepository;
use balizas_v16_lib::core::sync::{CycleOutcome, Refresher};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "balizas-v16",
    version,
    about = "Active V16 warning beacons reported by the DGT"
)]
struct Cli {
    /// Display language (es or en). Defaults to the saved preference.
    #[arg(long, global = true, value_name = "CODE")]
    lang: Option<String>,

    #[arg(long, global = true, value_name = "URL")]
    feed_url: Option<String>,

    /// Relay prefix; the encoded feed URL is appended to it
    #[arg(long, global = true, value_name = "URL")]
    relay_url: Option<String>,

    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch once and print the active beacons
    Show,
    /// Refresh on a fixed interval until Ctrl-C
    Watch {
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: Option<u64>,
    },
    /// Print the active beacons as a GeoJSON FeatureCollection
    Geojson,
    /// Save the display language preference
    Language { code: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Failed to load configuration: {error}");
            return ExitCode::FAILURE;
        }
    };
    apply_overrides(&mut config, &cli);
    init_tracing(&config.log_level);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(feed_url) = &cli.feed_url {
        config.feed.feed_url = feed_url.clone();
    }
    if let Some(relay_url) = &cli.relay_url {
        config.feed.relay_url = relay_url.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.feed.request_timeout = Duration::from_secs(secs);
    }
    if let Some(Command::Watch {
        interval_secs: Some(secs),
    }) = &cli.command
    {
        config.refresh_interval = Duration::from_secs(*secs);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), String> {
    match cli.command.unwrap_or(Command::Show) {
        Command::Show => {
            let language = resolve_language(cli.lang.as_deref(), &config.database_url).await?;
            show(language, config).await
        }
        Command::Watch { .. } => {
            let language = resolve_language(cli.lang.as_deref(), &config.database_url).await?;
            watch(language, config).await
        }
        Command::Geojson => geojson(config).await,
        Command::Language { code } => save_language(&code, &config.database_url).await,
    }
}

async fn show(language: Language, config: AppConfig) -> Result<(), String> {
    let client = FeedClient::new(config.feed).map_err(|error| error.to_string())?;
    println!("{}", translate(language, "loading"));
    let beacons = client
        .get_all()
        .await
        .map_err(|error| render_error(language, &error.to_string()))?;
    println!("{}", translate(language, "dataLoaded"));
    println!("{}", render_summary(language, &beacons, Local::now()));
    Ok(())
}

async fn watch(language: Language, config: AppConfig) -> Result<(), String> {
    let client = FeedClient::new(config.feed).map_err(|error| error.to_string())?;
    let mut refresher = Refresher::new(client, config.refresh_interval);
    let interval_secs = refresher.interval().as_secs();
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    println!("{}", translate(language, "loading"));
    refresher
        .run(shutdown, |outcome| {
            match outcome {
                CycleOutcome::Updated(snapshot) => {
                    println!(
                        "{}",
                        render_summary(language, &snapshot.beacons, snapshot.fetched_at)
                    );
                }
                CycleOutcome::Failed { error, previous } => {
                    println!("{}", render_error(language, &error.to_string()));
                    if let Some(snapshot) = previous {
                        println!(
                            "{}: {} ({})",
                            translate(language, "activeBeacons"),
                            snapshot.beacons.len(),
                            snapshot.fetched_at.format("%H:%M:%S")
                        );
                    }
                }
            }
            println!("{}", render_next_update(language, interval_secs));
        })
        .await;
    Ok(())
}

async fn geojson(config: AppConfig) -> Result<(), String> {
    let client = FeedClient::new(config.feed).map_err(|error| error.to_string())?;
    let beacons = client.get_all().await.map_err(|error| error.to_string())?;
    let collection = serde_json::to_string_pretty(&to_geojson(&beacons))
        .map_err(|error| error.to_string())?;
    println!("{collection}");
    Ok(())
}

async fn save_language(code: &str, database_url: &str) -> Result<(), String> {
    let language =
        Language::from_code(code).ok_or_else(|| format!("unsupported language: {code}"))?;
    let repository = SettingsRepository::connect(database_url)
        .await
        .map_err(|error| error.to_string())?;
    repository
        .save_language(language)
        .await
        .map_err(|error| error.to_string())?;
    info!(language = language.code(), "language preference updated");
    println!("{}: {}", translate(language, "languageSaved"), language.code());
    Ok(())
}

async fn resolve_language(requested: Option<&str>, database_url: &str) -> Result<Language, String> {
    if let Some(code) = requested {
        return Language::from_code(code).ok_or_else(|| format!("unsupported language: {code}"));
    }

    let repository = match SettingsRepository::connect(database_url).await {
        Ok(repository) => repository,
        Err(error) => {
            warn!(%error, "settings unavailable, using default language");
            return Ok(Language::default());
        }
    };
    match repository.load_language().await {
        Ok(language) => Ok(language),
        Err(error) => {
            warn!(%error, "could not read language preference, using default");
            Ok(Language::default())
        }
    }
}
