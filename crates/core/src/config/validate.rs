use super::{types::Config, ConfigError, MetadataBackend};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one preferred subtitle language
/// - The selected metadata backend has its section
/// - The write-stability poll interval is shorter than the stability window
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.pipeline.preferred_languages.is_empty() {
        return Err(ConfigError::ValidationError(
            "pipeline.preferred_languages must list at least one language".to_string(),
        ));
    }

    match config.metadata.backend {
        MetadataBackend::Tmdb if config.metadata.tmdb.is_none() => {
            return Err(ConfigError::ValidationError(
                "metadata.backend is \"tmdb\" but [metadata.tmdb] is missing".to_string(),
            ));
        }
        MetadataBackend::Imdb if config.metadata.imdb.is_none() => {
            return Err(ConfigError::ValidationError(
                "metadata.backend is \"imdb\" but [metadata.imdb] is missing".to_string(),
            ));
        }
        _ => {}
    }

    let watcher = &config.watcher;
    if watcher.enabled && watcher.root.is_none() {
        return Err(ConfigError::ValidationError(
            "watcher.enabled requires watcher.root".to_string(),
        ));
    }
    if watcher.poll_interval_ms == 0 || watcher.poll_interval_ms > watcher.stability_window_ms {
        return Err(ConfigError::ValidationError(
            "watcher.poll_interval_ms must be non-zero and not exceed watcher.stability_window_ms"
                .to_string(),
        ));
    }

    Ok(())
}
