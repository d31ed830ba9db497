use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use fleetpulse_smoke::checks::CheckContext;
use fleetpulse_smoke::cli::Cli;
use fleetpulse_smoke::runner::run_suite;
use fleetpulse_smoke::testing::Recorder;

// Failed checks show up in the report only; the exit status is always 0.
fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "invalid configuration");
            eprintln!("fleetpulse-smoke: {err}");
            return;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(%err, "failed to build tokio runtime");
            eprintln!("fleetpulse-smoke: failed to start runtime: {err}");
            return;
        }
    };

    runtime.block_on(async {
        let ctx = match CheckContext::from_config(&config) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::error!(%err, "failed to create API client");
                eprintln!("fleetpulse-smoke: {err}");
                return;
            }
        };

        let mut recorder = Recorder::console().strict(config.strict);
        run_suite(&ctx, &mut recorder).await;
    });
}
