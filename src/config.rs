//! Optional config file loading. Search order: ./reelscrape.toml, then
//! $XDG_CONFIG_HOME/reelscrape/config.toml (or ~/.config/reelscrape/config.toml).

use serde::Deserialize;

/// Environment variable consulted when `tmdb_api_key` is absent from the file.
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Which upstream family to read: "ophim" (JSON API) or "phimmoi" (HTML site).
    pub source: Option<String>,
    /// Base URL of the JSON API.
    pub api_base: Option<String>,
    /// Prefix prepended to bare image file names from the JSON API.
    pub image_base: Option<String>,
    /// Base URL of the HTML site.
    pub site_base: Option<String>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds for document and API fetches.
    pub timeout_secs: Option<u64>,
    /// Timeout in seconds for auxiliary lookups (TMDB, images).
    pub aux_timeout_secs: Option<u64>,
    /// Maximum number of cards read from one HTML grid page.
    pub grid_limit: Option<usize>,
    pub tmdb_api_key: Option<String>,
    /// Skip TLS certificate verification. Only for hosts with broken chains.
    pub accept_invalid_certs: Option<bool>,
    /// Stream extraction tool (default "yt-dlp").
    pub extractor_program: Option<String>,
    /// Wall-clock limit in seconds for one extraction run (default 60).
    pub extractor_timeout_secs: Option<u64>,
}

impl Config {
    /// TMDB key from the file, else from the environment.
    pub fn tmdb_api_key(&self) -> Option<String> {
        self.tmdb_api_key
            .clone()
            .or_else(|| std::env::var(TMDB_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Search order: (1) ./reelscrape.toml, (2) $XDG_CONFIG_HOME/reelscrape/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("reelscrape.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("reelscrape").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            return Ok(Some(config));
        }
    }
    Ok(None)
}
