use std::path::PathBuf;

use clap::Parser;
use handlebars::handlebars_helper;
use once_cell::sync::Lazy;

use crate::config::Config;
use crate::config::clap::Args;
use crate::notifier::{DEFAULT_WEBHOOK_PAYLOAD, Notifier, webhook_template_key};

/// Global CONFIG, loaded once from the config file.
pub static CONFIG: Lazy<Config> = Lazy::new(load_config);

/// Global TEMPLATE registry holding the search provider url templates, the
/// oembed endpoint template and the webhook payload templates.
pub static TEMPLATE: Lazy<handlebars::Handlebars> = Lazy::new(|| {
    let mut handlebars = handlebars::Handlebars::new();
    handlebars_helper!(urlencode: |s: String| {
        url::form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>()
    });
    handlebars.register_helper("urlencode", Box::new(urlencode));
    for (name, template) in &CONFIG.search_providers {
        handlebars
            .register_template_string(&search_template_key(name), template)
            .expect("failed to register search provider template");
    }
    if let Some(endpoint) = &CONFIG.oembed_endpoint {
        handlebars
            .register_template_string("oembed", endpoint)
            .expect("failed to register oembed template");
    }
    for notifier in &CONFIG.notifiers {
        if let Notifier::Webhook { url, template } = notifier {
            handlebars
                .register_template_string(
                    &webhook_template_key(url),
                    template.as_deref().unwrap_or(DEFAULT_WEBHOOK_PAYLOAD),
                )
                .expect("failed to register webhook payload template");
        }
    }
    handlebars
});

pub fn search_template_key(provider: &str) -> String {
    format!("search_{}", provider)
}

/// Global ARGS, parsed from the command line.
pub static ARGS: Lazy<Args> = Lazy::new(Args::parse);

/// Global CONFIG_DIR, the directory the config file and database live in.
pub static CONFIG_DIR: Lazy<PathBuf> =
    Lazy::new(|| dirs::config_dir().expect("No config path found").join("feed-sync"));

fn load_config() -> Config {
    if cfg!(test) {
        return Config::default();
    }
    info!("loading config file..");
    let config = Config::load().unwrap_or_else(|err| {
        if err
            .downcast_ref::<std::io::Error>()
            .is_none_or(|e| e.kind() != std::io::ErrorKind::NotFound)
        {
            panic!("failed to load config file: {err}");
        }
        warn!("config file not found, falling back to defaults..");
        Config::default()
    });
    config.save().expect("failed to save config file");
    info!("checking config..");
    config.check();
    info!("config check passed");
    config
}
