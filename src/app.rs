use crate::{
    collectors::Orchestrator,
    source::{
        DirectorySource,
        DocumentPaths,
        DocumentSource,
        FileSource,
    },
};
use clap::Parser;
use color_eyre::Result;
use eyre::Context as _;
use std::path::PathBuf;
use vrm_dashboard_config::{
    version,
    Args,
    Config,
    EndpointConfig,
};

/// VRM Dashboard
#[derive(Parser, Debug, Clone)]
#[command(author, version = version(), about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub args: Args,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Aggregate every configured endpoint from the data directory.
    Scan,
    /// Extract the metrics of a single endpoint from explicitly given files.
    Parse(ParseArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ParseArgs {
    /// Cockpit snapshot (`index.mhtml`).
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Camera list (`showCameras.html`).
    #[arg(long, value_name = "FILE")]
    pub cameras: Option<PathBuf>,

    /// Device list (`showDevices.html`).
    #[arg(long, value_name = "FILE")]
    pub devices: Option<PathBuf>,

    /// Storage overview (`showTargets.html`).
    #[arg(long, value_name = "FILE")]
    pub targets: Option<PathBuf>,

    #[arg(long, default_value = "BVMS")]
    pub bvms: String,

    #[arg(long, default_value = "")]
    pub vrm: String,

    /// Address the documents were fetched from.
    #[arg(long, default_value = "local")]
    pub ip: String,
}

impl ParseArgs {
    fn endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            bvms: self.bvms.clone(),
            vrm: self.vrm.clone(),
            ip: self.ip.clone(),
        }
    }

    fn paths(&self) -> DocumentPaths {
        DocumentPaths {
            index: self.index.clone(),
            cameras: self.cameras.clone(),
            devices: self.devices.clone(),
            targets: self.targets.clone(),
        }
    }
}

pub struct App {
    config: Config,
    command: Command,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self {
            config: Config::new(&cli.args)?,
            command: cli.command,
        })
    }

    /// `--verbose` or `verbose: true` in `config.yaml`.
    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    fn source(&self) -> Result<Box<dyn DocumentSource + Send + Sync>> {
        let source: Box<dyn DocumentSource + Send + Sync> = match &self.command {
            Command::Scan => {
                self.config.validate()?;
                if self.config.endpoints.is_empty() {
                    eyre::bail!("no endpoints configured in {}", self.config.config_dir().display());
                }
                Box::new(DirectorySource::new(
                    self.config.data_dir(),
                    self.config.endpoints.clone(),
                    self.config.dump_decoded,
                ))
            }
            Command::Parse(args) => {
                if args.paths() == DocumentPaths::default() {
                    eyre::bail!("parse needs at least one of --index, --cameras, --devices or --targets");
                }
                Box::new(FileSource::new(args.endpoint(), args.paths(), self.config.dump_decoded))
            }
            Command::Config => eyre::bail!("the config command reads no documents"),
        };
        Ok(source)
    }

    pub async fn run(self) -> Result<()> {
        if let Command::Config = self.command {
            print!("{}", self.config.to_yaml()?);
            return Ok(());
        }

        let mut orchestrator = Orchestrator::new(self.source()?, self.config.per_unit_merge);
        orchestrator.collect().await?;
        println!("{}", orchestrator.format());

        if let Some(output_file) = &self.config.output_file {
            let json = serde_json::to_string_pretty(&orchestrator.summary())?;
            tokio::fs::write(output_file, json)
                .await
                .with_context(|| format!("Failed to write {}", output_file.display()))?;
            info!(path = %output_file.display(), "Wrote snapshot");
        }

        Ok(())
    }
}
