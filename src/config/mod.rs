//! Configuration module for sshtap
//!
//! This module handles loading and parsing of configuration files,
//! including environment variable expansion and path resolution.

mod file;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use file::{
    config_search_paths, find_config_file, load_config, load_config_or_default, ConfigFile,
};

use crate::term::scrub::DEFAULT_PROMPT_PATTERN;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory for per-day audit logs
    /// Supports environment variable and tilde expansion
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Commands rejected instead of forwarded (exact match on the
    /// reconstructed line)
    #[serde(default = "default_deny_list")]
    pub deny_list: Vec<String>,

    /// SSH transport settings
    #[serde(default)]
    pub ssh: SshConfig,

    /// Full-screen-editor suppression settings
    #[serde(default)]
    pub suppression: SuppressionConfig,

    /// Batch execution settings
    #[serde(default)]
    pub batch: BatchConfig,
}

/// SSH transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SshConfig {
    /// Private key used for the first authentication attempt
    /// Supports environment variable and tilde expansion
    #[serde(default = "default_key_path")]
    pub key_path: String,

    /// TCP connect timeout
    /// Format: "3s", "500ms" is not supported, whole seconds and up
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,

    /// Transport keep-alive interval
    #[serde(default = "default_keepalive")]
    pub keepalive: String,

    /// Close the session after this long without traffic (unset: never)
    #[serde(default)]
    pub inactivity_timeout: Option<String>,

    /// Terminal type requested for the remote PTY
    #[serde(default = "default_term")]
    pub term: String,

    /// Port used when the command line does not override it
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Suppression configuration
///
/// Prompt detection is fuzzy pattern matching; the shapes are deliberately
/// configuration rather than constants because prompt formats vary per
/// site. The default pattern only recognizes `[user@host]$`-style prompts
/// and can both over- and under-suppress elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuppressionConfig {
    /// Command prefixes that enter a full-screen program (editor,
    /// foregrounded job). Matched against the reconstructed line.
    #[serde(default = "default_editor_commands")]
    pub editor_commands: Vec<String>,

    /// Regex that recognizes the shell prompt in remote output; a match
    /// while suppressed means the full-screen program exited.
    #[serde(default = "default_prompt_pattern")]
    pub prompt_pattern: String,
}

/// Batch execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Maximum concurrent sessions during `run`
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            deny_list: default_deny_list(),
            ssh: SshConfig::default(),
            suppression: SuppressionConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
            connect_timeout: default_connect_timeout(),
            keepalive: default_keepalive(),
            inactivity_timeout: None,
            term: default_term(),
            port: default_port(),
        }
    }
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            editor_commands: default_editor_commands(),
            prompt_pattern: default_prompt_pattern(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

fn default_log_dir() -> String {
    "~/.sshtap/logs".to_string()
}

fn default_deny_list() -> Vec<String> {
    vec!["reboot".to_string(), "shutdown".to_string(), "init".to_string()]
}

fn default_key_path() -> String {
    "~/.ssh/id_rsa".to_string()
}

fn default_connect_timeout() -> String {
    "3s".to_string()
}

fn default_keepalive() -> String {
    "30s".to_string()
}

fn default_term() -> String {
    "xterm".to_string()
}

fn default_port() -> u16 {
    22
}

fn default_editor_commands() -> Vec<String> {
    vec!["vi".to_string(), "fg".to_string()]
}

fn default_prompt_pattern() -> String {
    DEFAULT_PROMPT_PATTERN.to_string()
}

fn default_workers() -> usize {
    2
}

impl Config {
    /// Expand environment variables and tilde in all paths and parse
    /// duration strings.
    pub fn expand(&self) -> crate::Result<ExpandedConfig> {
        let inactivity_timeout = self
            .ssh
            .inactivity_timeout
            .as_deref()
            .map(parse_duration)
            .transpose()?;

        Ok(ExpandedConfig {
            log_dir: PathBuf::from(expand_path(&self.log_dir)?),
            deny_list: self.deny_list.clone(),
            key_path: PathBuf::from(expand_path(&self.ssh.key_path)?),
            connect_timeout: parse_duration(&self.ssh.connect_timeout)?,
            keepalive: parse_duration(&self.ssh.keepalive)?,
            inactivity_timeout,
            term: self.ssh.term.clone(),
            port: self.ssh.port,
            editor_commands: self.suppression.editor_commands.clone(),
            prompt_pattern: self.suppression.prompt_pattern.clone(),
            workers: self.batch.workers.max(1),
        })
    }
}

/// Configuration with paths expanded and durations parsed
#[derive(Debug, Clone)]
pub struct ExpandedConfig {
    pub log_dir: PathBuf,
    pub deny_list: Vec<String>,
    pub key_path: PathBuf,
    pub connect_timeout: Duration,
    pub keepalive: Duration,
    pub inactivity_timeout: Option<Duration>,
    pub term: String,
    pub port: u16,
    pub editor_commands: Vec<String>,
    pub prompt_pattern: String,
    pub workers: usize,
}

/// Expand environment variables and tilde in a path string
pub fn expand_path(path: &str) -> crate::Result<String> {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .map_err(|e| crate::Error::Config(format!("Failed to expand path '{}': {}", path, e)))
}

/// Parse a duration string like "1h", "30m", "10s", "1d"
pub fn parse_duration(s: &str) -> crate::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(crate::Error::Config("Empty duration string".to_string()));
    }

    let (num_str, unit) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, "s"));

    let num: u64 = num_str.trim().parse().map_err(|e| {
        crate::Error::Config(format!("Invalid duration number '{}': {}", num_str, e))
    })?;

    let seconds = match unit.to_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => num,
        "m" | "min" | "mins" | "minute" | "minutes" => num * 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => num * 60 * 60,
        "d" | "day" | "days" => num * 60 * 60 * 24,
        "" => num,
        _ => {
            return Err(crate::Error::Config(format!(
                "Unknown duration unit '{}' in '{}'",
                unit, s
            )));
        }
    };

    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("5").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_dir, "~/.sshtap/logs");
        assert_eq!(config.deny_list, vec!["reboot", "shutdown", "init"]);
        assert_eq!(config.ssh.port, 22);
        assert_eq!(config.ssh.term, "xterm");
        assert_eq!(config.ssh.connect_timeout, "3s");
        assert_eq!(config.suppression.editor_commands, vec!["vi", "fg"]);
        assert_eq!(config.batch.workers, 2);
    }

    #[test]
    fn test_expand_defaults() {
        let expanded = Config::default().expand().unwrap();
        assert_eq!(expanded.connect_timeout, Duration::from_secs(3));
        assert_eq!(expanded.keepalive, Duration::from_secs(30));
        assert!(expanded.inactivity_timeout.is_none());
        assert!(expanded.log_dir.is_absolute());
        assert_eq!(expanded.workers, 2);
    }

    #[test]
    fn test_expand_clamps_zero_workers() {
        let mut config = Config::default();
        config.batch.workers = 0;
        assert_eq!(config.expand().unwrap().workers, 1);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
log_dir = "/var/log/sshtap"
deny_list = ["reboot", "halt"]

[ssh]
key_path = "~/.ssh/audit_ed25519"
connect_timeout = "5s"
port = 2222

[suppression]
editor_commands = ["vi", "vim", "nano", "fg"]

[batch]
workers = 4
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_dir, "/var/log/sshtap");
        assert_eq!(config.deny_list, vec!["reboot", "halt"]);
        assert_eq!(config.ssh.port, 2222);
        assert_eq!(config.ssh.keepalive, "30s"); // default preserved
        assert_eq!(config.suppression.editor_commands.len(), 4);
        assert_eq!(config.batch.workers, 4);
    }

    #[test]
    fn test_parse_config_rejects_unknown_fields() {
        let result: Result<Config, _> = toml::from_str("unknown_field = true");
        assert!(result.is_err());
    }
}
