use std::env;

use add::add_labels;
use clap::Parser;
use cli::{Args, Commands};
use depot_config::{
    config::{
        self, config_path, generate_default_config, get_config, set_config_path, Config,
    },
    error::ConfigError,
};
use depot_core::{error::ErrorContext, DepotResult};
use depot_dl::http_client::ClientConfig;
use depot_utils::path::resolve_path;
use list::list_packages;
use logging::setup_logging;
use tracing::info;
use ureq::Proxy;
use user::handle_user_action;
use utils::{set_flag, COLOR, PROGRESS};

mod add;
mod cli;
mod list;
mod logging;
mod progress;
mod user;
mod utils;

fn client_config(args: &Args, config: &Config) -> DepotResult<ClientConfig> {
    let mut client = ClientConfig {
        timeout: Some(config.get_timeout()?),
        ..ClientConfig::default()
    };

    if let Some(user_agent) = args.user_agent.clone().or_else(|| config.user_agent.clone()) {
        client.user_agent = Some(user_agent);
    }

    if let Some(proxy) = args.proxy.as_deref() {
        let proxy = Proxy::new(proxy).map_err(depot_dl::error::DownloadError::from)?;
        client.proxy = Some(proxy);
    }

    Ok(client)
}

fn load_config() -> DepotResult<Config> {
    config::init()?;
    Ok(get_config())
}

fn handle_cli() -> DepotResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_flag(&COLOR, false);
    }

    if args.no_progress || args.json || args.quiet {
        set_flag(&PROGRESS, false);
    }

    if let Some(ref c) = args.config {
        let path = resolve_path(c).map_err(ConfigError::from)?;
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        set_config_path(path);
    }

    match &args.command {
        Commands::DefConfig => generate_default_config()?,
        Commands::Add { labels, owner } => {
            let config = load_config()?;
            let client = client_config(&args, &config)?;
            add_labels(&config, &client, labels, owner.as_deref())?;
            progress::stop();
        }
        Commands::List => list_packages(&load_config()?)?,
        Commands::User { action } => handle_user_action(&load_config()?, action)?,
        Commands::Env => {
            let config = load_config()?;
            info!("DEPOT_CONFIG={}", config_path().display());
            info!("DEPOT_DB={}", config.get_db_file()?.display());
            info!("DEPOT_STORAGE={}", config.get_storage_path()?.display());
            info!("DEPOT_INDEX_URL={}", config.index_url());
            if let Some(scratch) = config.get_scratch_path()? {
                info!("DEPOT_SCRATCH={}", scratch.display());
            }
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

