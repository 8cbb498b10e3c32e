use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::interval;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use verification_relay::{
    AppState, AttemptTracker, VerificationDispatcher,
    config::Args,
    handlers::router,
    metrics::TRACKED_IDENTIFIERS,
    providers::{
        IdentityToolkitClient, SendGridClient, ServiceAccountTokenSource, StaticToken, TokenSource,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional, real env vars win
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();

    // one client for both providers, with a deadline on every call
    let client = reqwest::Client::builder()
        .timeout(args.request_timeout())
        .build()?;

    let tokens: Arc<dyn TokenSource> = match (&args.service_account_key, &args.identity_access_token) {
        (Some(path), _) => {
            let source = ServiceAccountTokenSource::from_file(client.clone(), path)?;
            info!(client_email = %source.client_email(), "Using service account credentials");
            Arc::new(source)
        }
        (None, Some(token)) => Arc::new(StaticToken::new(token.clone())),
        (None, None) => anyhow::bail!("either a service account key or an access token is required"),
    };

    let identity = IdentityToolkitClient::new(
        client.clone(),
        args.identity_url.clone(),
        args.identity_project_id.clone(),
        tokens,
    );
    let mailer = SendGridClient::new(client, args.sendgrid_url.clone(), args.sendgrid_api_key.clone());

    let state = Arc::new(AppState {
        tracker: AttemptTracker::new(args.max_attempts, args.attempt_window()),
        dispatcher: VerificationDispatcher::new(
            Arc::new(identity),
            Arc::new(mailer),
            args.link_settings(),
            args.sender(),
        ),
    });

    // sweep attempt records nobody has touched for a while
    let sweep_state = state.clone();
    let sweep_every = args.eviction_interval();
    tokio::spawn(async move {
        let mut ticker = interval(sweep_every);
        loop {
            ticker.tick().await;
            let removed = sweep_state.tracker.evict_stale(Instant::now());
            TRACKED_IDENTIFIERS.set(sweep_state.tracker.len() as f64);
            debug!(removed, remaining = sweep_state.tracker.len(), "Swept attempt records");
        }
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        addr = %addr,
        max_attempts = args.max_attempts,
        attempt_window_ms = args.attempt_window_ms,
        request_timeout_secs = args.request_timeout_secs,
        from_email = %args.from_email,
        "Verification relay listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
