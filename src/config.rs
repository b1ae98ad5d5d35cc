use std::env;

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_flag(var: &str) -> bool {
    env::var(var).map(|v| v == "1").unwrap_or(false)
}

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    // HTTP server
    pub host: String,
    pub port: u16,

    // External tabular datastore
    pub store_base: String,
    pub store_token: String,
    pub vacancies_table_id: String,
    pub requirements_rel: String,

    // Behavior flags
    pub web_scrape_enabled: bool,
    pub auto_write_enabled: bool,
    pub auto_write_threshold: f64,
    pub default_scrape_pages: u32,

    // HTTP client
    pub request_timeout_secs: u64,

    // Dictionaries
    pub map_path: String,
    pub aliases_path: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            host: env_or("AGENT_HOST", "0.0.0.0"),
            port: env_or("AGENT_PORT", "8000").parse().unwrap_or(8000),
            store_base: env_or("NOCODB_BASE", "")
                .trim_end_matches('/')
                .to_string(),
            store_token: env_or("NOCODB_TOKEN", ""),
            vacancies_table_id: env_or("VACANCIES_TABLE_ID", ""),
            requirements_rel: env_or("VAC_REQ_REL", "Требования"),
            web_scrape_enabled: env_flag("WEB_SCRAPE_ENABLED"),
            auto_write_enabled: env_flag("AUTO_WRITE_ENABLED"),
            auto_write_threshold: env_or("AUTO_WRITE_THRESHOLD", "0.90")
                .parse()
                .unwrap_or(0.90),
            default_scrape_pages: env_or("WEB_DEFAULT_PAGES", "2").parse().unwrap_or(2),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SEC", "20").parse().unwrap_or(20),
            map_path: env_or("AGENT_MAP_PATH", "config/agent-map.json"),
            aliases_path: env_or("ALIASES_FILE", "config/aliases.yml"),
        }
    }
}
