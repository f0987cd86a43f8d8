// ABOUTME: Layered TOML configuration with env and CLI overrides
// ABOUTME: System file → user files → working dir file → env vars → CLI flags

use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const URL_ENV: &str = "TASKS_COLLECTOR_URL";
const USER_ENV: &str = "TASKS_COLLECTOR_USER";
const PASSWORD_ENV: &str = "TASKS_COLLECTOR_PASSWORD";

const DEFAULT_THREAD: &str = "Daily";
const DEFAULT_WEEKLY_THREAD: &str = "Weekly";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw contents of one configuration file. Every key is optional so files can be layered.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub tasks: TasksSection,
    #[serde(default)]
    pub http: HttpSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct TasksSection {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub default_thread: Option<String>,
    pub weekly_thread: Option<String>,
    pub ignore_habits: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub throttle_ms: Option<(u64, u64)>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid config: {}", e)))
    }

    /// Layers `other` on top of `self`; keys set in `other` win.
    pub fn merge(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            tasks: TasksSection {
                url: other.tasks.url.or(self.tasks.url),
                user: other.tasks.user.or(self.tasks.user),
                password: other.tasks.password.or(self.tasks.password),
                default_thread: other.tasks.default_thread.or(self.tasks.default_thread),
                weekly_thread: other.tasks.weekly_thread.or(self.tasks.weekly_thread),
                ignore_habits: other.tasks.ignore_habits.or(self.tasks.ignore_habits),
            },
            http: HttpSection {
                timeout_secs: other.http.timeout_secs.or(self.http.timeout_secs),
                throttle_ms: other.http.throttle_ms.or(self.http.throttle_ms),
            },
        }
    }
}

/// Connection values that may come from the environment or the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Overrides {
            url: env::var(URL_ENV).ok(),
            user: env::var(USER_ENV).ok(),
            password: env::var(PASSWORD_ENV).ok(),
        }
    }
}

/// Fully resolved settings handed to every command.
#[derive(Debug)]
pub struct Config {
    pub url: String,
    pub user: String,
    pub password: SecretString,
    pub default_thread: String,
    pub weekly_thread: String,
    pub ignore_habits: Vec<String>,
    pub timeout: Duration,
    pub throttle_ms: Option<(u64, u64)>,
}

impl Config {
    pub fn load(explicit: Option<&Path>, cli: Overrides) -> Result<Self> {
        let file = match explicit {
            Some(path) => read_config_file(path)?.ok_or_else(|| {
                Error::Config(format!("config file {} not found", path.display()))
            })?,
            None => {
                let mut merged = ConfigFile::default();
                for path in default_paths() {
                    if let Some(layer) = read_config_file(&path)? {
                        tracing::debug!(path = %path.display(), "loaded config layer");
                        merged = merged.merge(layer);
                    }
                }
                merged
            }
        };

        Self::resolve(file, Overrides::from_env(), cli)
    }

    /// Applies overrides in order file < env < cli and checks required keys.
    pub fn resolve(file: ConfigFile, env: Overrides, cli: Overrides) -> Result<Self> {
        let missing = |key: &str| {
            Error::Config(format!(
                "missing `{}`; create ~/.tasks-collector.toml with a [tasks] section \
                 containing url/user/password",
                key
            ))
        };

        let url = cli.url.or(env.url).or(file.tasks.url).ok_or_else(|| missing("url"))?;
        let user = cli.user.or(env.user).or(file.tasks.user).ok_or_else(|| missing("user"))?;
        let password = cli
            .password
            .or(env.password)
            .or(file.tasks.password)
            .ok_or_else(|| missing("password"))?;

        if let Some((min, max)) = file.http.throttle_ms {
            if min > max {
                return Err(Error::Config("http.throttle_ms: min must be <= max".into()));
            }
        }

        Ok(Config {
            url: url.trim_end_matches('/').to_string(),
            user,
            password: SecretString::from(password),
            default_thread: file
                .tasks
                .default_thread
                .unwrap_or_else(|| DEFAULT_THREAD.into()),
            weekly_thread: file
                .tasks
                .weekly_thread
                .unwrap_or_else(|| DEFAULT_WEEKLY_THREAD.into()),
            ignore_habits: file.tasks.ignore_habits.unwrap_or_default(),
            timeout: Duration::from_secs(file.http.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            throttle_ms: file.http.throttle_ms,
        })
    }
}

/// Search path, lowest priority first.
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/tasks-collector.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("tasks-collector").join("config.toml"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".tasks-collector.toml"));
    }
    paths.push(PathBuf::from("tasks-collector.toml"));

    paths
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    match ConfigFile::parse(&content) {
        Ok(file) => Ok(Some(file)),
        Err(Error::Config(msg)) => Err(Error::Config(format!("{}: {}", path.display(), msg))),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    const FULL: &str = r#"
[tasks]
url = "https://tasks.example.com/"
user = "me"
password = "hunter2"
default_thread = "Journal"
ignore_habits = ["meta", "test"]

[http]
timeout_secs = 5
throttle_ms = [10, 20]
"#;

    #[test]
    fn test_parse_full_file() {
        let file = ConfigFile::parse(FULL).unwrap();
        assert_eq!(file.tasks.user.as_deref(), Some("me"));
        assert_eq!(file.http.throttle_ms, Some((10, 20)));
    }

    #[test]
    fn test_parse_invalid_file() {
        assert!(matches!(
            ConfigFile::parse("[tasks\nurl = 1"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_resolve_defaults() {
        let file = ConfigFile::parse(FULL).unwrap();
        let config = Config::resolve(file, Overrides::default(), Overrides::default()).unwrap();

        assert_eq!(config.url, "https://tasks.example.com");
        assert_eq!(config.password.expose_secret(), "hunter2");
        assert_eq!(config.default_thread, "Journal");
        assert_eq!(config.weekly_thread, "Weekly");
        assert_eq!(config.ignore_habits, vec!["meta", "test"]);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let file = ConfigFile::parse(FULL).unwrap();
        let env = Overrides {
            url: Some("https://env.example.com".into()),
            user: Some("env-user".into()),
            password: None,
        };
        let cli = Overrides {
            url: None,
            user: Some("cli-user".into()),
            password: None,
        };

        let config = Config::resolve(file, env, cli).unwrap();
        assert_eq!(config.url, "https://env.example.com");
        assert_eq!(config.user, "cli-user");
        assert_eq!(config.password.expose_secret(), "hunter2");
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let file = ConfigFile::parse("[tasks]\nurl = \"https://x\"\nuser = \"me\"\n").unwrap();
        let err = Config::resolve(file, Overrides::default(), Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("password"));
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let system =
            ConfigFile::parse("[tasks]\nurl = \"https://system\"\nuser = \"sys\"\n").unwrap();
        let user = ConfigFile::parse("[tasks]\nuser = \"me\"\n").unwrap();

        let merged = system.merge(user);
        assert_eq!(merged.tasks.url.as_deref(), Some("https://system"));
        assert_eq!(merged.tasks.user.as_deref(), Some("me"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, FULL).unwrap();

        let cli = Overrides {
            password: Some("from-cli".into()),
            ..Overrides::default()
        };
        let config = Config::load(Some(&path), cli).unwrap();
        assert_eq!(config.password.expose_secret(), "from-cli");
    }

    #[test]
    fn test_invalid_file_names_its_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        fs::write(&path, "[tasks\nurl = ").unwrap();

        let err = read_config_file(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken.toml: invalid config"));
        assert_eq!(message.matches("invalid config").count(), 1);
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("nope.toml")), Overrides::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_inverted_throttle_rejected() {
        let file = ConfigFile::parse(
            "[tasks]\nurl = \"u\"\nuser = \"me\"\npassword = \"p\"\n\
             [http]\nthrottle_ms = [50, 10]\n",
        )
        .unwrap();
        assert!(Config::resolve(file, Overrides::default(), Overrides::default()).is_err());
    }
}
