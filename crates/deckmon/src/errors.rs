use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Could not determine a configuration path")]
    #[diagnostic(
        code(config::no_path),
        help("Pass --config <path> to choose where the configuration lives")
    )]
    ConfigPathUnknown,

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Run 'deckmon config init' to write a default configuration")
    )]
    ConfigNotFound { path: Utf8PathBuf },

    #[error("Configuration file error: {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check the file for TOML syntax errors or unknown value types")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        #[source]
        source: deckmon_core::Error,
    },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(config::already_exists),
        help("Use --force to overwrite it with the defaults")
    )]
    ConfigExists { path: Utf8PathBuf },

    #[error("Invalid app id: {app_id}")]
    #[diagnostic(
        code(resolve::invalid_app_id),
        help("App ids are unsigned decimal numbers, e.g. 620")
    )]
    InvalidAppId { app_id: String },

    #[error("Detection engine error")]
    #[diagnostic(code(engine::error))]
    Engine {
        #[from]
        source: deckmon_core::Error,
    },

    #[error("JSON output failed")]
    #[diagnostic(code(output::json))]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn config_parse_error(path: Utf8PathBuf, source: deckmon_core::Error) -> Self {
        Self::ConfigParseError { path, source }
    }

    pub fn invalid_app_id(app_id: String) -> Self {
        Self::InvalidAppId { app_id }
    }
}
