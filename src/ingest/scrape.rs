use anyhow::{bail, Result};
use tracing::info;

use crate::config::Settings;
use crate::record::Record;
use crate::TARGET_WEB_REQUEST;

/// Scrape vacancy listings from zarplata.ru.
///
/// Online scraping is off by default and gated behind the
/// `WEB_SCRAPE_ENABLED` flag.
pub fn scrape_zarplata(
    settings: &Settings,
    query: &str,
    hospital: Option<&str>,
    pages: u32,
) -> Result<Vec<Record>> {
    if !settings.web_scrape_enabled {
        bail!("WEB scraping is disabled. Set WEB_SCRAPE_ENABLED=1 to enable.");
    }
    info!(
        target: TARGET_WEB_REQUEST,
        "scrape zarplata query='{}' hospital={:?} pages={}", query, hospital, pages
    );
    // TODO: fetch the zarplata.ru listing pages and parse the markup into Records
    Ok(Vec::new())
}

/// Scrape vacancy listings from hh.ru. Same gating as `scrape_zarplata`.
pub fn scrape_hh(
    settings: &Settings,
    query: &str,
    hospital: Option<&str>,
    pages: u32,
) -> Result<Vec<Record>> {
    if !settings.web_scrape_enabled {
        bail!("WEB scraping is disabled. Set WEB_SCRAPE_ENABLED=1 to enable.");
    }
    info!(
        target: TARGET_WEB_REQUEST,
        "scrape hh query='{}' hospital={:?} pages={}", query, hospital, pages
    );
    // TODO: fetch the hh.ru listing pages and parse the markup into Records
    Ok(Vec::new())
}
