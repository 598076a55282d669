use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

mod clap;
mod global;
mod item;

pub use crate::config::global::{ARGS, CONFIG, CONFIG_DIR, TEMPLATE, search_template_key};
pub use crate::config::item::{ConcurrentLimit, RateLimit};
use crate::notifier::Notifier;

fn default_search_providers() -> BTreeMap<String, Cow<'static, str>> {
    BTreeMap::from([
        (
            "youtube".to_string(),
            Cow::Borrowed("https://gdata.youtube.com/feeds/api/videos?alt=rss&orderby=published&q={{urlencode query}}"),
        ),
        (
            "vimeo".to_string(),
            Cow::Borrowed("https://vimeo.com/search/{{urlencode query}}/rss"),
        ),
    ])
}

#[derive(Serialize, Deserialize)]
pub struct Config {
    /// Seconds between polling passes.
    pub interval: u64,
    /// Upper bound on videos that may be Active at once; imports above the
    /// limit land as Unapproved even when the source auto-approves. None
    /// means unlimited.
    #[serde(default)]
    pub video_limit: Option<u64>,
    pub thumbnail_path: PathBuf,
    /// Per-video metadata endpoint used by the drift checker, rendered with
    /// the video's website url as `{{link}}`. Drift checking is skipped when
    /// unset.
    #[serde(default)]
    pub oembed_endpoint: Option<Cow<'static, str>>,
    /// Search provider url templates, rendered with `{{urlencode query}}`.
    #[serde(default = "default_search_providers")]
    pub search_providers: BTreeMap<String, Cow<'static, str>>,
    #[serde(default)]
    pub notifiers: Vec<Notifier>,
    #[serde(default)]
    pub concurrent_limit: ConcurrentLimit,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: 1200,
            video_limit: None,
            thumbnail_path: CONFIG_DIR.join("thumbnails"),
            oembed_endpoint: None,
            search_providers: default_search_providers(),
            notifiers: Vec::new(),
            concurrent_limit: ConcurrentLimit::default(),
        }
    }
}

impl Config {
    pub fn save(&self) -> Result<()> {
        let config_path = CONFIG_DIR.join("config.toml");
        std::fs::create_dir_all(&*CONFIG_DIR)?;
        std::fs::write(config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn load() -> Result<Self> {
        let config_path = CONFIG_DIR.join("config.toml");
        let config_content = std::fs::read_to_string(config_path)?;
        Ok(toml::from_str(&config_content)?)
    }

    pub fn check(&self) {
        let mut ok = true;
        if self.interval == 0 {
            ok = false;
            error!("interval must be greater than zero");
        }
        if !self.thumbnail_path.is_absolute() {
            ok = false;
            error!(
                "thumbnail_path should be absolute, got: {}",
                self.thumbnail_path.display()
            );
        }
        for (name, template) in &self.search_providers {
            if !template.contains("query") {
                ok = false;
                error!("search provider \"{}\" template has no query placeholder", name);
            }
        }
        if self.concurrent_limit.source == 0 || self.concurrent_limit.thumbnail == 0 {
            ok = false;
            error!("source and thumbnail concurrency must be greater than zero");
        }
        if !ok {
            panic!(
                "config file at {} is invalid, fix the issues above and restart",
                CONFIG_DIR.join("config.toml").display()
            );
        }
    }
}
