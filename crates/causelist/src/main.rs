mod cli;

use anyhow::{Context, anyhow, bail};
use causelist_e::WebDriverBackend;
use causelist_engine::backend::Backend;
use causelist_engine::config::{CauselistConfig, ConfigLoader};
use causelist_engine::formatter::{format_options, format_result};
use causelist_engine::pipeline::AcquisitionPipeline;
use causelist_engine::protocol::ResolvedOptions;
use causelist_engine::resolver::SelectorResolver;
use causelist_engine::session::SessionManager;
use causelist_engine::store::DocumentStore;
use causelist_h::HeadlessBackend;
use clap::Parser;
use cli::{Args, BackendKind, Command};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only command output.
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = ConfigLoader::load(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    args.apply(&mut config);

    if !args.needs_browser() {
        return locate(&args, &config).await;
    }

    let backend: Box<dyn Backend> = match args.backend {
        BackendKind::Headless => Box::new(HeadlessBackend::new(config.browser.clone())),
        BackendKind::Webdriver => Box::new(WebDriverBackend::new(config.browser.clone())),
    };
    let mut session = SessionManager::new(backend, config.portal.base_url.clone());

    let outcome = tokio::select! {
        result = run(&args, &config, &mut session) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down browser session");
            Err(anyhow!("Interrupted"))
        }
    };

    session.release().await;
    outcome
}

async fn run(
    args: &Args,
    config: &CauselistConfig,
    session: &mut SessionManager<dyn Backend>,
) -> anyhow::Result<()> {
    let resolver = SelectorResolver::from_config(config);

    match &args.command {
        Command::States => {
            let resolved = resolver.list_states(session).await;
            print_options(args, &resolved)
        }
        Command::Districts { state } => {
            let resolved = resolver.list_districts(session, state).await;
            print_options(args, &resolved)
        }
        Command::Complexes { state, district } => {
            let resolved = resolver.list_complexes(session, state, district).await;
            print_options(args, &resolved)
        }
        Command::Courts {
            state,
            district,
            complex,
        } => {
            let resolved = resolver
                .list_courts(session, state, district, complex)
                .await;
            print_options(args, &resolved)
        }
        Command::Scrape { .. } => {
            let request = args
                .command
                .request_fields()
                .context("scrape arguments missing")?
                .validate()?;

            let pipeline = AcquisitionPipeline::from_config(config);
            let result = pipeline.run(session, &request).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", format_result(&result));
            }
            if !result.success {
                bail!(
                    "Cause list could not be rendered: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            Ok(())
        }
        Command::Locate { .. } => Ok(()),
    }
}

async fn locate(args: &Args, config: &CauselistConfig) -> anyhow::Result<()> {
    if let Command::Locate { name } = &args.command {
        let path = DocumentStore::new(&config.output.dir).resolve(name).await?;
        println!("{}", path.display());
    }
    Ok(())
}

fn print_options(args: &Args, resolved: &ResolvedOptions) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(resolved)?);
    } else {
        println!("{}", format_options(resolved));
    }
    Ok(())
}
