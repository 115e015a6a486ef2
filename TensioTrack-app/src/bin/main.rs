use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tensio_track_app::{shared_lines, App, Args, PromptConfirmation, Renderer};
use tensio_track_data::ApiClient;
use tensio_track_domain::services::{create_remote_auth_service, create_remote_measurement_service};

/// Install the tracing subscriber, writing to stderr so logs never mix with the screens
fn init_tracing(log_level: Option<&str>) {
    let env_filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}

/// Entry point of the TensioTrack terminal client
///
/// Loads `.env`, parses the arguments, connects the services to the remote
/// API and runs the shell on stdin until `quit` or end of input.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_loaded = dotenv().is_ok();
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    if !dotenv_loaded {
        debug!(".env file not found, using process environment only");
    }

    let config = args.api_config().context("Configuration de l'API invalide")?;
    let client = ApiClient::new(&config).context("Impossible de créer le client HTTP")?;
    info!("Starting TensioTrack against {}", client.base_url());

    let renderer = Renderer::new(args.json);
    let lines = shared_lines(tokio::io::stdin());
    let mut app = App::new(
        create_remote_measurement_service(client.clone()),
        create_remote_auth_service(client),
        PromptConfirmation::new(lines.clone(), std::io::stdout(), renderer, args.yes),
        renderer,
    );

    app.run(lines, &mut std::io::stdout()).await
}
