use std::path::PathBuf;
use vrm_report::MergePolicy;

/// Settings that can be overridden from the command line, on top of `config.yaml`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Args {
    /// Directory holding the fetched documents, one `<bvms>/<vrm or ip>/` folder per endpoint.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// How per-unit counters are combined when two endpoints report the same unit.
    #[arg(long, global = true, value_name = "POLICY")]
    pub per_unit_merge: Option<MergePolicy>,

    /// Additionally export the aggregated snapshot as JSON.
    #[arg(long, global = true, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Write the decoded cockpit page next to each archive (`index.decoded.html`).
    #[arg(long, global = true, action)]
    pub dump_decoded: bool,

    /// Enables debug logging.
    #[arg(short, long, global = true, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(data_dir) = &self.data_dir {
                cache.insert("data_dir".to_string(), data_dir.display().to_string().into());
            }
            if let Some(policy) = &self.per_unit_merge {
                cache.insert("per_unit_merge".to_string(), policy.to_string().into());
            }
            if let Some(output_file) = &self.output_file {
                cache.insert("output_file".to_string(), output_file.display().to_string().into());
            }
            if self.dump_decoded {
                cache.insert("dump_decoded".to_string(), true.into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "{}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        clap::crate_version!()
    )
}
