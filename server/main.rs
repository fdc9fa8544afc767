/// ferrite-style server
///
/// Serves a single page for picking an image and a style, and a POST route
/// that returns the stylized image as a JPEG data URI.
/// Served by a synchronous tiny_http server, one thread per request.
///
/// Run with:
///   cargo run --bin style-server --release -- --styles-dir styles
/// Then open http://127.0.0.1:5000
///
/// Routes:
///   GET  /          the page
///   POST /stylize   fields `style` and `content` (data URI or base64)
///   GET  /styles    JSON list of available styles

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tiny_http::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ferrite_style::network::get_device;
use ferrite_style::{StyleLibrary, StylizeConfig, Stylizer};

use state::ServerState;

const MAX_BODY_MB: u64 = 4096;

/// Neural style transfer over HTTP.
#[derive(Parser, Debug)]
#[command(name = "style-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Directory holding `<style>.pth` / `<style>.safetensors` weight files.
    #[arg(long, default_value = "styles", value_name = "DIR")]
    styles_dir: PathBuf,

    /// Shorter side of the image fed to the network, in pixels.
    #[arg(long, default_value = "512", value_name = "PX")]
    image_size: u32,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value = "75", value_name = "INT")]
    quality: u8,

    /// Largest accepted request body, in megabytes (1-4096).
    #[arg(long, default_value = "32", value_name = "MB",
          value_parser = clap::value_parser!(u64).range(1..=MAX_BODY_MB))]
    max_body_mb: u64,

    /// Run inference on the CPU even when a GPU is available.
    #[arg(long)]
    cpu: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ferrite_style={log_level},style_server={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(args: Args) -> Result<()> {
    let library = StyleLibrary::new(&args.styles_dir);
    library
        .ensure_dir()
        .with_context(|| format!("Failed to create styles directory {}", args.styles_dir.display()))?;

    let max_body_bytes = body_limit_bytes(args.max_body_mb)?;
    let config = StylizeConfig { image_size: args.image_size, jpeg_quality: args.quality };
    let stylizer = Stylizer::new(library, get_device(args.cpu), config)
        .context("Invalid stylization settings")?;

    let styles = stylizer.library().list().unwrap_or_default();
    if styles.is_empty() {
        tracing::warn!("No weight files found in {}", args.styles_dir.display());
    } else {
        tracing::info!("Available styles: {}", styles.join(", "));
    }

    let addr = format!("{}:{}", args.host, args.port);
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("Failed to bind HTTP server on {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    let shared_state = Arc::new(ServerState::new(stylizer, max_body_bytes));

    // Requests are independent; each gets its own thread so a long forward
    // pass does not stall page loads.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}

/// Converts the `--max-body-mb` setting to bytes.
fn body_limit_bytes(mb: u64) -> Result<usize> {
    usize::try_from(mb)
        .ok()
        .and_then(|mb| mb.checked_mul(1024 * 1024))
        .with_context(|| format!("--max-body-mb {mb} does not fit in memory on this platform"))
}
