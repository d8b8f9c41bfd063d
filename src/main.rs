mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use ib_core::config::Config;
use ib_core::{derive_keys, Category, ImageFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imagebucket=trace,ib_core=trace,ib_image=trace,ib_store=trace,ib_service=trace,ib_server=trace,tower_http=debug".to_string()
        } else {
            "imagebucket=info,ib_core=info,ib_image=info,ib_store=info,ib_service=info,ib_server=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(ib_server::start(config))?;
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Purge => {
            let config = load_config(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(purge(config))
        }
        Commands::DeriveKeys {
            category,
            path,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let category = category.unwrap_or(config.images.default_category);
            print_keys(&category, &path, json)
        }
        Commands::Version => {
            println!("imagebucket {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) if p.exists() => {
            tracing::debug!("Loading config from {}", p.display());
            Config::load(p).with_context(|| format!("Failed to load config from {}", p.display()))
        }
        other => Ok(Config::load_or_default(other)),
    }
}

async fn purge(config: Config) -> Result<()> {
    let service = ib_server::build_service(&config)
        .await
        .context("Failed to connect to the blob store")?;

    let summary = service.purge().await?;
    println!(
        "Purged {} objects from bucket '{}' ({} pages)",
        summary.deleted,
        service.bucket().name(),
        summary.pages
    );
    Ok(())
}

fn print_keys(category: &str, path: &str, json: bool) -> Result<()> {
    let category = Category::parse(category)?;
    let format = ImageFormat::from_path(path)?;
    let keys = derive_keys(category.as_str(), path);

    if json {
        let value = serde_json::json!({
            "original_key": keys.original_key,
            "variant_key": keys.variant_key,
            "reference": keys.reference(),
            "file_token": keys.file_token,
            "format": format,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Original:  {}", keys.original_key);
        println!("Variant:   {}", keys.variant_key);
        println!("Reference: {}", keys.reference());
        println!("Token:     {}", keys.file_token);
        println!("Format:    {format}");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for warning in &warnings {
            println!("⚠ {warning}");
        }
    }

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!(
        "  Storage: {:?} bucket '{}' (page size {}, {} concurrent deletes)",
        config.storage.backend,
        config.storage.bucket,
        config.storage.page_size,
        config.storage.delete_concurrency
    );
    if let Some(ref dir) = config.images.staging_dir {
        println!("  Staging dir: {}", dir.display());
    }
    println!("  Default category: {}", config.images.default_category);

    Ok(())
}
