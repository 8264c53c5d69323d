use std::{fs::File, path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BarErr, ContextExt};

fn default_extension() -> Arc<str> {
    "md".into()
}

fn default_language() -> Arc<str> {
    "en".into()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub content_path: PathBuf,
    pub dist_path: PathBuf,
    /// Suffix of content files, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: Arc<str>,
    pub domain: Arc<Url>,
    pub title: Arc<str>,
    pub description: Arc<str>,
    #[serde(default = "default_language")]
    pub language: Arc<str>,
    /// Image used by listings for posts that do not declare one.
    #[serde(default)]
    pub default_image: Option<Arc<str>>,
}

impl TryFrom<PathBuf> for Config {
    type Error = BarErr;
    fn try_from(value: PathBuf) -> Result<Self, BarErr> {
        let config_path = value.join("config.yaml");
        let f = File::open(&config_path)
            .with_context(|| format!("config file: {}", config_path.display()))?;
        serde_yaml::from_reader(f).map_err(|source| BarErr::Config {
            path: config_path,
            source,
        })
    }
}

impl Config {
    pub fn feed_url(&self, path: &str) -> Result<Url, BarErr> {
        Ok(self.domain.join(path)?)
    }
}
