//! Product Tag CLI - Render catalog product links for static-site templates.

use anyhow::{Context, Result};
use clap::Parser;
use product_tag_core::{SiteConfig, TagRenderer};
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "product-tag")]
#[command(author, version, about = "Render catalog product links", long_about = None)]
struct Args {
    /// Render instructions, e.g. "text B000ABC123" (read from stdin, one per line, if omitted)
    instructions: Vec<String>,

    /// Catalog lookup endpoint
    #[arg(long, env = "PRODUCT_TAG_ENDPOINT")]
    endpoint: Option<String>,

    /// Associate (affiliate) tag
    #[arg(long, env = "PRODUCT_TAG_ASSOCIATE_TAG")]
    associate_tag: Option<String>,

    /// API access key
    #[arg(long, env = "PRODUCT_TAG_ACCESS_KEY")]
    access_key: Option<String>,

    /// API secret key
    #[arg(long, env = "PRODUCT_TAG_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Catalog country code
    #[arg(long, env = "PRODUCT_TAG_COUNTRY")]
    country: Option<String>,

    /// Persist lookups under this directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Disable the disk cache even if configured
    #[arg(long, conflicts_with = "cache_dir")]
    no_cache: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep rendering after a failed instruction
    #[arg(long)]
    keep_going: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Apply CLI and environment overrides on top of the loaded file.
    fn apply(&self, config: &mut SiteConfig) {
        if let Some(ref endpoint) = self.endpoint {
            config.catalog.endpoint.clone_from(endpoint);
        }
        if self.associate_tag.is_some() {
            config.lookup.associate_tag.clone_from(&self.associate_tag);
        }
        if self.access_key.is_some() {
            config.lookup.access_key.clone_from(&self.access_key);
        }
        if self.secret_key.is_some() {
            config.lookup.secret_key.clone_from(&self.secret_key);
        }
        if let Some(ref country) = self.country {
            config.lookup.country.clone_from(country);
        }
        if let Some(ref dir) = self.cache_dir {
            config.cache.enabled = true;
            config.cache.directory.clone_from(dir);
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}

fn read_instructions(args: &Args) -> Result<Vec<String>> {
    if !args.instructions.is_empty() {
        return Ok(args.instructions.clone());
    }

    let stdin = std::io::stdin();
    let mut instructions = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read instructions from stdin")?;
        if !line.trim().is_empty() {
            instructions.push(line);
        }
    }
    Ok(instructions)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG takes precedence over -v
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        SiteConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        SiteConfig::load()
    };
    args.apply(&mut config);

    let instructions = read_instructions(&args)?;
    if instructions.is_empty() {
        anyhow::bail!("No instructions to render");
    }

    info!("Rendering {} instructions", instructions.len());

    let renderer = TagRenderer::from_config(config).context("Failed to initialize renderer")?;

    let mut failures = 0usize;
    for instruction in &instructions {
        match renderer.render(instruction).await {
            Ok(html) => {
                // CLI output is intentional
                #[allow(clippy::print_stdout)]
                {
                    println!("{html}");
                }
            }
            Err(e) if args.keep_going => {
                tracing::error!("{}: {}", instruction, e);
                failures += 1;
            }
            Err(e) => {
                return Err(e).context(format!("Failed to render {instruction:?}"));
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} instructions failed", instructions.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let args = Args::parse_from([
            "product-tag",
            "--associate-tag",
            "site-22",
            "--cache-dir",
            "/tmp/amazon",
            "--country",
            "jp",
            "text B000ABC123",
        ]);
        let mut config = SiteConfig::default();
        args.apply(&mut config);

        assert_eq!(config.lookup.associate_tag.as_deref(), Some("site-22"));
        assert_eq!(config.lookup.country, "jp");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.directory, PathBuf::from("/tmp/amazon"));
        assert_eq!(args.instructions, vec!["text B000ABC123".to_string()]);
    }

    #[test]
    fn test_no_cache_disables_configured_cache() {
        let args = Args::parse_from(["product-tag", "--no-cache", "text B1"]);
        let mut config = SiteConfig::default();
        config.cache.enabled = true;
        args.apply(&mut config);
        assert!(!config.cache.enabled);
    }
}
