//! Layered configuration loading
//!
//! Sources in increasing priority: built-in defaults, `waymark.toml` in the
//! working directory (or an explicit file), `WAYMARK_` environment variables.
//! Sections are separated by a double underscore, e.g.
//! `WAYMARK_GEOCODING__BASE_URL` or `WAYMARK_ROUTING__DEFAULT_PORT`.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use integration_geo::GeoConfig;

const DEFAULT_CONFIG_NAME: &str = "waymark";
const ENV_PREFIX: &str = "WAYMARK";

/// Load configuration from the default file location and the process environment
pub fn load(path: Option<&Path>) -> Result<GeoConfig, ConfigError> {
    load_with_env(path, None)
}

/// Load configuration with an explicit environment map in place of the process one
pub fn load_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<GeoConfig, ConfigError> {
    let file = path.map_or_else(
        || File::with_name(DEFAULT_CONFIG_NAME).required(false),
        |path| File::from(path).required(true),
    );

    let config: GeoConfig = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?
        .try_deserialize()?;

    config.validate().map_err(ConfigError::Message)?;
    Ok(config)
}
