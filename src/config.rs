use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use crate::error::{Result, RosterError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ORG: &str = "HackYourFuture";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub org: String,
    pub api_base: String,
    pub per_page: u8,
    pub show_avatars: bool,
    pub avatar_rows: u16,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: DEFAULT_ORG.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            per_page: 100,
            show_avatars: true,
            avatar_rows: 2,
            log_file: None,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub org: Option<String>,
    pub api_base: Option<String>,
    pub per_page: Option<u8>,
    pub no_avatars: bool,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn load(overrides: Overrides) -> Self {
        let config_file = config_dir().join("roster").join("config.toml");
        Self::load_from(&config_file, overrides)
    }

    pub fn load_from(config_file: &Path, overrides: Overrides) -> Self {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(config_file));
        }

        figment = figment.merge(Env::prefixed("ROSTER_").ignore(&["log"]));

        if let Some(org) = overrides.org {
            figment = figment.merge(Serialized::default("org", org));
        }
        if let Some(base) = overrides.api_base {
            figment = figment.merge(Serialized::default("api_base", base));
        }
        if let Some(n) = overrides.per_page {
            figment = figment.merge(Serialized::default("per_page", n));
        }
        if overrides.no_avatars {
            figment = figment.merge(Serialized::default("show_avatars", false));
        }
        if let Some(path) = overrides.log_file {
            figment = figment.merge(Serialized::default("log_file", path));
        }

        match figment.extract::<Config>() {
            Ok(config) => config.clamped(),
            Err(e) => {
                let err = RosterError::Config(e.to_string());
                eprintln!("warning: {err}, using defaults");
                Config::default()
            }
        }
    }

    fn clamped(mut self) -> Self {
        // GitHub caps per_page at 100
        self.per_page = self.per_page.clamp(1, 100);
        self.avatar_rows = self.avatar_rows.clamp(1, 4);
        self
    }

    pub fn repos_url(&self) -> String {
        format!(
            "{}/orgs/{}/repos?per_page={}",
            self.api_base.trim_end_matches('/'),
            self.org,
            self.per_page
        )
    }

    /// The effective settings in config-file form.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RosterError::Config(e.to_string()))
    }

    pub fn resolved_log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| state_dir().join("roster").join("roster.log"))
    }
}

pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

fn state_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state")
}

fn xdg_dir(var: &str, home_suffix: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(home_suffix))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn defaults_point_at_hyf_org() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml"), Overrides::default());
        assert_eq!(config.org, "HackYourFuture");
        assert_eq!(
            config.repos_url(),
            "https://api.github.com/orgs/HackYourFuture/repos?per_page=100"
        );
    }

    #[test]
    #[serial]
    fn file_then_cli_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "org = \"rust-lang\"\nper_page = 30\nshow_avatars = false").unwrap();

        let config = Config::load_from(
            &path,
            Overrides {
                per_page: Some(250),
                ..Overrides::default()
            },
        );
        assert_eq!(config.org, "rust-lang");
        assert!(!config.show_avatars);
        assert_eq!(config.per_page, 100, "per_page is capped at the API maximum");

        let config = Config::load_from(
            &path,
            Overrides {
                org: Some("tokio-rs".to_string()),
                per_page: Some(10),
                ..Overrides::default()
            },
        );
        assert_eq!(config.org, "tokio-rs");
        assert_eq!(config.per_page, 10);
    }

    #[test]
    #[serial]
    fn env_layer_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "org = \"from-file\"\n").unwrap();

        std::env::set_var("ROSTER_ORG", "from-env");
        let config = Config::load_from(&path, Overrides::default());
        std::env::remove_var("ROSTER_ORG");

        assert_eq!(config.org, "from-env");
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let config = Config {
            api_base: "http://127.0.0.1:9000/".to_string(),
            per_page: 5,
            ..Config::default()
        };
        assert_eq!(
            config.repos_url(),
            "http://127.0.0.1:9000/orgs/HackYourFuture/repos?per_page=5"
        );
    }

    #[test]
    #[serial]
    fn printed_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            org: "rust-lang".to_string(),
            avatar_rows: 3,
            ..Config::default()
        };
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::load_from(&path, Overrides::default());
        assert_eq!(loaded.org, "rust-lang");
        assert_eq!(loaded.avatar_rows, 3);
        assert!(loaded.log_file.is_none());
    }
}
