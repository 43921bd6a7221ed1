//! testtextureaddressmode - texture address mode and border color test
//!
//! # Usage
//!
//! ```bash
//! testtextureaddressmode
//! testtextureaddressmode --windows 2 --renderer gl
//! testtextureaddressmode --drive scheduled --verbose event
//! ```
//!
//! # Keyboard Shortcuts
//!
//! - U / V: Cycle the u / v address mode
//! - B: Cycle the border color
//! - ESC: Quit

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rendertest_addressmode::{AddressModeTest, defaults};
use rendertest_core::app::{self, CommonArgs, RunSummary, SetupError};
use rendertest_core::WgpuRenderer;

#[derive(Parser)]
#[command(name = "testtextureaddressmode")]
#[command(
    author,
    version,
    about = "Display a texture with changeable address modes and border colors"
)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn run(args: &Args) -> Result<RunSummary, SetupError> {
    let config = args.common.load_config()?;
    let options = args.common.resolve(&defaults(), &config);
    app::run(options, AddressModeTest::<WgpuRenderer>::initialize)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(summary) => {
            if let Some(fps) = summary.average_fps() {
                println!("{:.2} frames per second", fps);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Setup failed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
