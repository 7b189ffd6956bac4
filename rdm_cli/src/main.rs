use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use rdm_core::{DownloadConfig, Downloader, ProgressListener, ReqwestHttpClient};

mod terminal_observer;
use terminal_observer::TerminalProgressListener;

/// Parallel HTTP file downloader.
#[derive(Parser)]
#[command(name = "rdm", about = "Rust Download Manager")]
struct Args {
    /// URL of the file to download
    #[arg(value_parser = parse_http_url)]
    url: String,

    /// Path to write the downloaded file to
    output_path: PathBuf,

    /// Size in bytes of each parallel range request
    #[arg(long, default_value_t = 1024 * 1024)]
    chunk_size: u64,

    /// Maximum number of concurrent range requests
    #[arg(long, default_value_t = 4)]
    parallel: usize,

    /// Maximum retry attempts per range before giving up
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Initial backoff delay in milliseconds between retries (doubles each attempt)
    #[arg(long, default_value_t = 1000)]
    retry_delay_ms: u64,
}

fn parse_http_url(value: &str) -> Result<String, String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(format!("url must begin with http:// or https://, got: {value}"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = match DownloadConfig::new(args.chunk_size, args.parallel, args.retries, args.retry_delay_ms) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let http_client = Arc::new(ReqwestHttpClient::new());
    // Bar length is a placeholder until the downloader's own probe reports
    // the real content length on the first progress update.
    let listener: Arc<TerminalProgressListener> = Arc::new(TerminalProgressListener::new(1));
    let downloader = Downloader::new(http_client, config)
        .with_progress_listener(listener.clone() as Arc<dyn ProgressListener>);

    let cancel_handle = downloader.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("received interrupt signal, cancelling download");
            cancel_handle.cancel();
        }
    });

    println!("Starting download: {}", args.url);
    let start = Instant::now();

    match downloader.download(&args.url, &args.output_path).await {
        Ok(()) => {
            listener.finish();
            let elapsed = start.elapsed();
            println!("Download completed in {:.2}s", elapsed.as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(err) => {
            listener.abandon(err.to_string());
            eprintln!("Download failed: {err}");
            ExitCode::FAILURE
        }
    }
}
