use std::time::Instant;

use chess_rules::config::AppConfig;
use chess_rules::engine::perft;
use chess_rules::new_game;

fn main() {
    let config = AppConfig::from_env();

    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    tracing::info!(
        "chess_rules v{} running perft to depth {}",
        env!("CARGO_PKG_VERSION"),
        config.perft_depth
    );

    let game = new_game();
    for depth in 1..=config.perft_depth {
        let started = Instant::now();
        match perft::perft(&game, depth) {
            Ok(nodes) => tracing::info!(
                depth,
                nodes,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "perft"
            ),
            Err(e) => {
                tracing::error!(depth, "perft aborted: {e}");
                std::process::exit(1);
            }
        }
    }
}
