#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod endpoint;

use app_config::AppConfig;
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::{
    version,
    Args,
};
use color_eyre::Result;
pub use endpoint::{
    safe_name,
    EndpointConfig,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};
use vrm_report::MergePolicy;

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    app_config: AppConfig,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
    #[serde(default)]
    pub per_unit_merge: MergePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub dump_decoded: bool,
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Layers the factory presets, `config.yaml` from the config directory and the command-line overrides.
    pub fn new(args: &Args) -> Result<Self, config::ConfigError> {
        Self::load(&get_config_dir(), &get_data_dir(), args)
    }

    fn load(config_dir: &Path, data_dir: &Path, args: &Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.display().to_string())?
            .set_default("config_dir", config_dir.display().to_string())?;

        builder = builder.add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args.clone());

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(endpoints = cfg.endpoints.len(), policy = %cfg.per_unit_merge, "Loaded configuration");

        Ok(cfg)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    /// Rejects endpoints that could never be located on disk.
    ///
    /// # Errors
    /// Returns an error naming the first endpoint without an IP address.
    pub fn validate(&self) -> Result<()> {
        if let Some((index, endpoint)) = self.endpoints.iter().enumerate().find(|(_, e)| e.ip.trim().is_empty()) {
            eyre::bail!("endpoint #{} ({}) has no ip address", index + 1, endpoint.label());
        }
        Ok(())
    }

    /// The effective configuration as YAML, including the directories.
    pub fn to_yaml(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Effective<'a> {
            config_dir: &'a Path,
            data_dir: &'a Path,
            #[serde(flatten)]
            config: &'a Config,
        }
        let effective = Effective {
            config_dir: self.config_dir(),
            data_dir: self.data_dir(),
            config: self,
        };
        Ok(serde_yml::to_string(&effective)?)
    }
}
