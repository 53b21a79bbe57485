use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The reserved mapping key that marks an indirection node.
    pub ref_key: String,
    /// Hard bound on the length of an indirection chain.
    pub max_resolution_depth: usize,
}

impl Settings {
    pub fn new(base_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/refrax/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.refrax",
                    base_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert base_dir to str"))?
                ))
                .required(false),
            )
            .set_default("ref_key", "$ref")?
            .set_default("max_resolution_depth", 64)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            ref_key: "$ref".to_string(),
            max_resolution_depth: 64,
        }
    }
}
