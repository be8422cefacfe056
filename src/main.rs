use std::sync::Arc;

use dotenv::dotenv;
use jackpot_quiz::config::{Config, SourceConfig};
use jackpot_quiz::quiz::{
    rng::QuizRng,
    session::GameSession,
    source::{OpenTriviaSource, QuestionSource, StaticSource},
};
use jackpot_quiz::server;

type MainResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> MainResult {
    // A missing .env is fine, everything has a default
    let _ = dotenv();

    pretty_env_logger::init();
    log::info!("Starting quiz server...");

    let config = Config::from_env()?;

    match config.source.clone() {
        SourceConfig::Remote {
            url,
            category,
            batch_size,
            timeout,
        } => {
            log::info!("Questions come from {}", url);
            let source = OpenTriviaSource::new(url, batch_size, category, timeout)?;
            serve(source, config).await
        }
        SourceConfig::File(path) => {
            log::info!("Loading questions from {}", path.display());
            let source = StaticSource::open(&path)?;
            if source.is_empty() {
                log::warn!("{} holds no questions", path.display());
            }
            log::info!("{} questions loaded", source.len());
            serve(source, config).await
        }
    }
}

async fn serve<S: QuestionSource>(source: S, config: Config) -> MainResult {
    let rng = match config.seed {
        Some(seed) => QuizRng::new(seed),
        None => QuizRng::from_entropy(),
    };
    log::debug!("RNG seed {}", rng.seed());

    let session = Arc::new(GameSession::new(source, config.rules.clone(), rng)?);

    // The server still comes up without a game; POST /game/restart retries
    if let Err(err) = session
        .start_game_with_retry(config.start_attempts, config.retry_backoff)
        .await
    {
        log::error!("No game could be started: {}", err);
    }

    let app = server::create_router(session);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    log::info!("Server is running on http://localhost:{}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Stopping server...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install the Ctrl+C handler: {}", err);
        std::future::pending::<()>().await;
    }
}
