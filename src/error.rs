use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInputShape(String),
    #[error(
        "unknown profile{} {}; valid profiles: {}",
        plural(.unknown),
        quoted(.unknown),
        joined(.valid)
    )]
    UnknownProfile {
        unknown: Vec<String>,
        valid: Vec<String>,
    },
    #[error("invalid profile '{key}': {reason}")]
    InvalidProfile { key: String, reason: String },
    #[error("timeline width must be > 0")]
    InvalidTimelineWidth,
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn plural(keys: &[String]) -> &'static str {
    if keys.len() == 1 {
        ""
    } else {
        "s"
    }
}

fn joined(keys: &[String]) -> String {
    keys.join(", ")
}

fn quoted(keys: &[String]) -> String {
    keys.iter()
        .map(|key| format!("'{}'", key))
        .collect::<Vec<_>>()
        .join(", ")
}
