use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::SimConfig;

#[derive(Parser, Debug)]
#[command(name = "gvl-sim", args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation (default)
    Run(RunArgs),
    /// List the built-in request profiles
    ListProfiles,
    /// Print the resolved configuration without running it
    ShowConfig(RunArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[arg(long, help = "TOML or JSON config file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Comma-separated profile keys, one per thread")]
    pub threads: Option<String>,
    #[arg(long = "thread", short = 't', help = "Profile key for one thread (repeatable)")]
    pub thread: Vec<String>,
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    #[arg(long, help = "Shortcut for --format summary")]
    pub summary: bool,
    #[arg(long, help = "Timeline width in columns")]
    pub width: Option<usize>,
    #[arg(long, short = 'v', help = "Log scheduler activity to stderr")]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Debug, Default, Eq, PartialEq)]
pub enum FormatArg {
    #[default]
    Human,
    Summary,
    Timeline,
    Json,
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatArg::Human => "human",
            FormatArg::Summary => "summary",
            FormatArg::Timeline => "timeline",
            FormatArg::Json => "json",
        };
        write!(f, "{}", name)
    }
}

pub fn parse_args() -> Result<Cli> {
    match Cli::try_parse() {
        Ok(cli) => Ok(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => Err(Error::Cli(e.to_string())),
    }
}

pub fn build_config(args: RunArgs) -> Result<(SimConfig, FormatArg)> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    let mut threads = match &args.threads {
        Some(csv) => parse_threads(csv)?,
        None => Vec::new(),
    };
    for key in &args.thread {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidInputShape(
                "thread profile key must not be empty".to_string(),
            ));
        }
        threads.push(key.to_string());
    }
    if !threads.is_empty() {
        config.threads = threads;
    }

    if let Some(width) = args.width {
        config.timeline_width = width;
    }
    if config.timeline_width == 0 {
        return Err(Error::InvalidTimelineWidth);
    }

    let format = if args.summary {
        FormatArg::Summary
    } else {
        args.format.unwrap_or_default()
    };

    Ok((config, format))
}

pub fn parse_threads(input: &str) -> Result<Vec<String>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(',')
        .enumerate()
        .map(|(idx, entry)| {
            let trimmed = entry.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidInputShape(format!(
                    "empty profile key at position {}",
                    idx
                )));
            }
            Ok(trimmed.to_string())
        })
        .collect()
}

pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    let value: serde_json::Value = match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err)))?,
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err)))?,
        "" => return Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => return Err(Error::UnsupportedConfigFormat(ext.to_string())),
    };

    check_threads_shape(&value)?;
    serde_json::from_value(value)
        .map_err(|err| Error::ConfigParse(format!("invalid config: {}", err)))
}

fn check_threads_shape(value: &serde_json::Value) -> Result<()> {
    let Some(threads) = value.get("threads") else {
        return Err(Error::InvalidInputShape(
            "config is missing 'threads'".to_string(),
        ));
    };
    let Some(entries) = threads.as_array() else {
        return Err(Error::InvalidInputShape(
            "'threads' must be an array of profile keys".to_string(),
        ));
    };
    if let Some(idx) = entries.iter().position(|entry| !entry.is_string()) {
        return Err(Error::InvalidInputShape(format!(
            "'threads' entry {} is not a string",
            idx
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_threads_accepts_valid_list() {
        let threads = parse_threads("low-io, heavy-io,low-io").unwrap();
        assert_eq!(threads, vec!["low-io", "heavy-io", "low-io"]);
    }

    #[test]
    fn parse_threads_treats_blank_input_as_no_threads() {
        assert!(parse_threads("").unwrap().is_empty());
        assert!(parse_threads("  ").unwrap().is_empty());
    }

    #[test]
    fn parse_threads_rejects_empty_segments() {
        let err = parse_threads("low-io,,heavy-io").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: empty profile key at position 1"
        );
        assert!(parse_threads("low-io,").is_err());
        assert!(parse_threads(",").is_err());
    }

    #[test]
    fn build_config_appends_repeated_threads_after_csv() {
        let args = RunArgs {
            threads: Some("low-io".to_string()),
            thread: vec!["heavy-io".to_string()],
            ..RunArgs::default()
        };
        let (config, format) = build_config(args).unwrap();
        assert_eq!(config.threads, vec!["low-io", "heavy-io"]);
        assert_eq!(config.timeline_width, 60);
        assert_eq!(format, FormatArg::Human);
    }

    #[test]
    fn build_config_summary_flag_wins() {
        let args = RunArgs {
            format: Some(FormatArg::Json),
            summary: true,
            ..RunArgs::default()
        };
        let (_, format) = build_config(args).unwrap();
        assert_eq!(format, FormatArg::Summary);
    }

    #[test]
    fn build_config_rejects_zero_width() {
        let args = RunArgs {
            width: Some(0),
            ..RunArgs::default()
        };
        assert_eq!(
            build_config(args).unwrap_err().to_string(),
            "timeline width must be > 0"
        );
    }

    #[test]
    fn threads_shape_is_checked() {
        let ok = serde_json::json!({ "threads": ["low-io"] });
        assert!(check_threads_shape(&ok).is_ok());

        let not_array = serde_json::json!({ "threads": "low-io" });
        assert!(matches!(
            check_threads_shape(&not_array),
            Err(Error::InvalidInputShape(_))
        ));

        let not_strings = serde_json::json!({ "threads": ["low-io", 3] });
        assert_eq!(
            check_threads_shape(&not_strings).unwrap_err().to_string(),
            "invalid input: 'threads' entry 1 is not a string"
        );
    }
}
