use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};

use invoice_api::middleware::{AuthGate, LoginRateLimiter};
use invoice_api::{build_router, AppState, HttpSettings};
use invoice_core::ports::{Mailer, PdfRenderer};
use invoice_core::repositories::UserRepository;
use invoice_core::services::{AuthService, AuthSettings, DocumentService};
use invoice_infrastructure::{
    create_pool, run_migrations, ChromiumPdfRenderer, InMemoryUserRepository, LogMailer,
    PgUserRepository, SmtpMailer,
};
use invoice_security::{JwtService, ResetTokenHasher};
use invoice_shared::config::{DatabaseDriver, MailTransport};
use invoice_shared::AppConfig;

const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    invoice_shared::telemetry::init_telemetry();

    info!("Invoice Server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Credential store
    let user_repo: Arc<dyn UserRepository> = match config.database.driver {
        DatabaseDriver::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database)
                .await
                .context("connecting to database")?;
            run_migrations(&pool).await.context("running migrations")?;
            info!("Database connection established.");
            Arc::new(PgUserRepository::new(pool))
        }
        DatabaseDriver::Memory => {
            info!("Using in-memory user store; accounts are lost on restart");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    // Outbound collaborators
    let mailer: Arc<dyn Mailer> = match config.email.transport {
        MailTransport::Smtp => Arc::new(SmtpMailer::new(&config.email)?),
        MailTransport::Log => Arc::new(LogMailer),
    };
    let renderer: Arc<dyn PdfRenderer> = Arc::new(ChromiumPdfRenderer::new(&config.renderer)?);

    // Services
    let tokens = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.session_token_ttl()?,
    ));
    let reset_tokens = ResetTokenHasher::new(config.reset_token_key())?;
    let auth_service = AuthService::new(
        user_repo,
        mailer,
        tokens.clone(),
        reset_tokens,
        AuthSettings {
            reset_token_ttl: config.reset_token_ttl(),
            frontend_url: config.app.frontend_url.clone(),
        },
    );

    let login_limiter = Arc::new(LoginRateLimiter::new(
        config.rate_limit.login_max_attempts,
        Duration::from_secs(config.rate_limit.login_window_seconds),
    ));
    spawn_limiter_cleanup(login_limiter.clone());

    let state = AppState {
        auth_service: Arc::new(auth_service),
        document_service: Arc::new(DocumentService::new(renderer)),
        auth_gate: Arc::new(AuthGate::new(tokens)),
        login_limiter,
    };
    let app = build_router(state, &HttpSettings::from_config(&config));

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Invoice Server stopped");
    Ok(())
}

fn spawn_limiter_cleanup(limiter: Arc<LoginRateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            tracing::debug!("rate limiting storage size: {}", limiter.len());
            limiter.retain_recent();
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
