use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::debug;
use thiserror::Error;

static DEFAULT_INSTANCES: &[&str] = &[
    "https://inv.nadeko.net/",
    "https://invidious.f5.si/",
    "https://invidious.lunivers.trade/",
    "https://invidious.ducks.party/",
    "https://super8.absturztau.be/",
    "https://invidious.nikkosphere.com/",
    "https://yt.omada.cafe/",
    "https://iv.melmac.space/",
    "https://iv.duti.dev/",
];

static DEFAULT_TRENDING_INSTANCES: &[&str] = &["https://inv.nadeko.net/"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No mirror instances configured")]
    NoInstances,

    #[error("Invalid port {0:?}")]
    InvalidPort(String),
}

/// On-disk `config.json`. Every key is optional and overrides the default.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    web_host: Option<String>,
    web_port: Option<u16>,
    youtube_api_key: Option<String>,
    youtube_api_url: Option<String>,
    instances: Option<Vec<String>>,
    trending_instances: Option<Vec<String>>,
    video_info_api: Option<String>,
    stream_api: Option<String>,
    m3u8_api: Option<String>,
    user_agent: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub web_host: String,
    pub web_port: u16,
    #[serde(skip_serializing)]
    pub youtube_api_key: Option<String>,
    pub youtube_api_url: String,
    /// Mirror instances in priority order
    pub instances: Vec<String>,
    pub trending_instances: Vec<String>,
    pub video_info_api: String,
    pub stream_api: String,
    pub m3u8_api: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            web_host: "0.0.0.0".into(),
            web_port: 5000,
            youtube_api_key: None,
            youtube_api_url: "https://www.googleapis.com".into(),
            instances: DEFAULT_INSTANCES.iter().map(|x| x.to_string()).collect(),
            trending_instances: DEFAULT_TRENDING_INSTANCES
                .iter()
                .map(|x| x.to_string())
                .collect(),
            video_info_api: "https://siawaseok.duckdns.org/api/video2/".into(),
            stream_api: "https://ytdl-0et1.onrender.com/stream/".into(),
            m3u8_api: "https://ytdl-0et1.onrender.com/m3u8/".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
        }
    }
}

/// Ensure base URL ends in a slash so paths can be appended directly
fn with_slash(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.into()
    } else {
        format!("{}/", url)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

impl Config {
    /// Defaults, overlaid with `config.json` (if present) and then environment variables
    pub fn load() -> Result<Config> {
        let mut cfg = Config::default();
        if let Some(dir) = config_dir() {
            let path = dir.join("config.json");
            if path.exists() {
                cfg.apply_file(&path)?;
            } else {
                debug!("No config file at {:?}", &path);
            }
        }
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        debug!("Loading config from {:?}", path);
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let f: ConfigFile = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        if let Some(v) = f.web_host {
            self.web_host = v;
        }
        if let Some(v) = f.web_port {
            self.web_port = v;
        }
        if f.youtube_api_key.is_some() {
            self.youtube_api_key = non_empty(f.youtube_api_key);
        }
        if let Some(v) = f.youtube_api_url {
            self.youtube_api_url = v.trim_end_matches('/').into();
        }
        if let Some(v) = f.instances {
            self.instances = v.iter().map(|x| with_slash(x)).collect();
        }
        if let Some(v) = f.trending_instances {
            self.trending_instances = v.iter().map(|x| with_slash(x)).collect();
        }
        if let Some(v) = f.video_info_api {
            self.video_info_api = with_slash(&v);
        }
        if let Some(v) = f.stream_api {
            self.stream_api = with_slash(&v);
        }
        if let Some(v) = f.m3u8_api {
            self.m3u8_api = with_slash(&v);
        }
        if let Some(v) = f.user_agent {
            self.user_agent = v;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("YOUTUBE_API_KEY") {
            self.youtube_api_key = non_empty(Some(key));
        }
        if let Some(host) = non_empty(lookup("TUBEAGG_HOST")) {
            self.web_host = host;
        }
        if let Some(port) = non_empty(lookup("TUBEAGG_PORT")) {
            self.web_port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(list) = non_empty(lookup("TUBEAGG_INSTANCES")) {
            self.instances = list
                .split(',')
                .map(|x| x.trim())
                .filter(|x| !x.is_empty())
                .map(with_slash)
                .collect();
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::NoInstances);
        }
        if self.web_port == 0 {
            return Err(ConfigError::InvalidPort(self.web_port.to_string()));
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.youtube_api_key.is_some()
    }
}

/// `$TUBEAGG_CONFIG_DIR`, otherwise the platform config directory
fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("TUBEAGG_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    ProjectDirs::from("uk.co", "dbrweb", "tubeagg").map(|pd| pd.config_dir().to_path_buf())
}
