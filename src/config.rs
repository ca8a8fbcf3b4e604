use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the list-rendering service that serves catalogs
    #[serde(default = "default_list_endpoint")]
    pub list_endpoint: String,

    /// Base URL of the IMDB site scraped for watchlist ids
    #[serde(default = "default_imdb_base_url")]
    pub imdb_base_url: String,

    /// Sort order requested from the list-rendering service
    #[serde(default = "default_list_sort")]
    pub list_sort: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7505
}

fn default_list_endpoint() -> String {
    "https://stremio-imdb-list.now.sh".to_string()
}

fn default_imdb_base_url() -> String {
    "https://m.imdb.com".to_string()
}

fn default_list_sort() -> String {
    "date_added".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            list_endpoint: default_list_endpoint(),
            imdb_base_url: default_imdb_base_url(),
            list_sort: default_list_sort(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
