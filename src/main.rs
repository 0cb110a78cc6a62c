use clap::Parser;
use color_eyre::Result;
use vrm_dashboard::{
    init_errors,
    init_logging,
    App,
    Cli,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let app = App::new(Cli::parse())?;
    init_logging(app.verbose())?;

    app.run().await
}
