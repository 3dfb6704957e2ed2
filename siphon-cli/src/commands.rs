//! CLI command implementations

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Subcommand;
use siphon_core::config::SiphonConfig;
use siphon_core::resolver::{MetadataResolver, YtDlpResolver};
use siphon_core::watch_url::WatchUrl;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
        /// Directory saved files are served from
        #[arg(long)]
        downloads_dir: Option<PathBuf>,
        /// Directory static assets are served from
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Resolve a URL and print its format catalog
    Formats {
        /// Video URL (short or long form)
        url: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns the underlying error of whichever command fails.
pub async fn handle_command(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve {
            bind,
            downloads_dir,
            static_dir,
        } => serve(bind, downloads_dir, static_dir).await,
        Commands::Formats { url } => list_formats(url).await,
    }
}

async fn serve(
    bind: SocketAddr,
    downloads_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SiphonConfig::default();
    if let Some(dir) = downloads_dir {
        config.storage.downloads_dir = dir;
    }
    if let Some(dir) = static_dir {
        config.web.static_dir = dir;
    }
    siphon_web::run_server(config, bind).await
}

async fn list_formats(url: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = SiphonConfig::default();
    let watch_url = WatchUrl::parse(&url)?;
    let resolver = YtDlpResolver::new(config.resolver);
    let metadata = resolver.resolve(&watch_url).await?;

    println!("{} - {}", metadata.title, metadata.uploader);
    for format in &metadata.formats {
        let size = format
            .filesize
            .map(|bytes| format!("{:.1} MiB", bytes as f64 / 1_048_576.0))
            .unwrap_or_else(|| "unknown size".to_string());
        println!("  {:>8}  {:<24} {}", format.format_id, format.format_name, size);
    }
    Ok(())
}
