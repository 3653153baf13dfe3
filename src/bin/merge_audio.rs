//! Command-line variant: fetch a list of URLs, merge them and write one file.

use std::path::PathBuf;

use clap::Parser;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use audio_merge::audio::{export, format_hint};
use audio_merge::config::AppConfig;
use audio_merge::services::fetcher::Fetcher;
use audio_merge::services::merger::{merge_files, merge_segments};
use audio_merge::utils::filenames::merged_filename;

#[derive(Parser)]
#[command(name = "merge-audio")]
#[command(about = "Download audio files and concatenate them in order", long_about = None)]
struct Cli {
    /// Audio URLs, merged in the order given
    #[arg(required = true)]
    urls: Vec<String>,

    /// Output file; its extension picks the format. Defaults to the joined input names
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory the downloads are saved in
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Re-read the saved downloads from disk instead of merging the decoded copies
    #[arg(long)]
    from_disk: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let fetcher = Fetcher::new(Client::new(), config.ffmpeg_path.clone());

    let mut fetched = Vec::with_capacity(cli.urls.len());
    for url in &cli.urls {
        fetched.push(fetcher.fetch(url, &cli.dir).await?);
    }

    let output = match cli.output {
        Some(path) => path,
        None => {
            let names: Vec<&str> = fetched.iter().map(|f| f.source.filename.as_str()).collect();
            cli.dir.join(merged_filename(&names, &config.merged_format))
        }
    };
    let format = format_hint(&output).unwrap_or_else(|| config.merged_format.clone());

    let merged = if cli.from_disk {
        let paths: Vec<PathBuf> = fetched.iter().map(|f| f.local_path.clone()).collect();
        merge_files(&paths)?
    } else {
        merge_segments(fetched.into_iter().map(|f| f.segment))?
    };

    export(&merged, &output, &format, &config.ffmpeg_path)?;
    info!(
        "Wrote {:.2}s of audio to {}",
        merged.duration().as_secs_f64(),
        output.display()
    );
    Ok(())
}
