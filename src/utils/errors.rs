use thiserror::Error;

/// Errors raised while loading configuration or acquiring the URL list
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("YAML parse error: {0}")]
    YamlParseError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No URLs found in {0}")]
    EmptyInput(String),
}

impl From<std::io::Error> for SetupError {
    fn from(err: std::io::Error) -> Self {
        SetupError::IoError(err.to_string())
    }
}

impl From<serde_yaml::Error> for SetupError {
    fn from(err: serde_yaml::Error) -> Self {
        SetupError::YamlParseError(err.to_string())
    }
}

impl From<serde_json::Error> for SetupError {
    fn from(err: serde_json::Error) -> Self {
        SetupError::JsonParseError(err.to_string())
    }
}

impl From<reqwest::Error> for SetupError {
    fn from(err: reqwest::Error) -> Self {
        SetupError::HttpError(err.to_string())
    }
}
