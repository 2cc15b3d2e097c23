//! sinepoly - play or bounce the demo sequence
//!
//! Run with: cargo run -- [play|bounce] [config.yaml]

mod app;
mod demo;

use color_eyre::eyre::{bail, Result as EyreResult, WrapErr};
use sinepoly::SynthConfig;
use tracing_subscriber::EnvFilter;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "play".to_string());
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => SynthConfig::default(),
    };

    match mode.as_str() {
        "play" => app::play(config, demo::piano_phase()?),
        "bounce" => app::bounce(config, demo::piano_phase()?),
        other => bail!("unknown mode {other:?}, expected \"play\" or \"bounce\""),
    }
}

#[cfg(feature = "serde")]
fn load_config(path: &str) -> EyreResult<SynthConfig> {
    SynthConfig::from_yaml_file(path).wrap_err_with(|| format!("failed to load {path}"))
}

#[cfg(not(feature = "serde"))]
fn load_config(path: &str) -> EyreResult<SynthConfig> {
    Err(color_eyre::eyre::eyre!("cannot read {path}")).wrap_err("built without the serde feature")
}
