/// Runtime configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Depth the binary runs perft to from the starting position.
    pub perft_depth: u32,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        AppConfig {
            perft_depth: std::env::var("CHESS_PERFT_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            log_filter: std::env::var("CHESS_LOG")
                .unwrap_or_else(|_| "chess_rules=info".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            perft_depth: 3,
            log_filter: "chess_rules=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.perft_depth, 3);
        assert_eq!(config.log_filter, "chess_rules=info");
    }

    #[test]
    fn from_env_defaults() {
        // Without setting env vars, should fall back to defaults
        let config = AppConfig::from_env();
        assert_eq!(config.perft_depth, 3);
        assert_eq!(config.log_filter, "chess_rules=info");
    }
}
