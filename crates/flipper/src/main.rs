//! Flipper - fetch every image a host lists, mirror it, and upload it back.
//!
//! Flipper takes no arguments. The host and all tuning knobs come from the
//! config file (`$FLIPPER_CONFIG` or the platform config dir), and
//! `FLIPPER_BASE_URL` overrides the host.
//!
//! ```bash
//! FLIPPER_BASE_URL=http://images.internal/images/ flipper > report.json
//! ```
//!
//! Exits 0 once a batch completes, whatever happened to individual images.
//! A config file that can't be read or doesn't validate is reported on
//! stderr and replaced by the defaults. Exits non-zero only if the listing
//! request is rejected, the HTTP client can't be built, or the report can't
//! be written.

use std::io::{self, BufWriter};

use flipper_core::config::BASE_URL_ENV;
use flipper_core::{Config, ConfigError, Orchestrator, OutputFormat, OutputWriter};

mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging isn't initialized yet, so use eprintln for config warnings.
    let mut config = config_or_default(Config::load());
    if let Err(e) = config.apply_env_overrides() {
        eprintln!("Warning: Ignoring {BASE_URL_ENV}: {e}");
    }
    logging::init_from_config(&config);

    tracing::debug!("Flipper v{}", flipper_core::VERSION);
    tracing::info!("Using host {}", config.base_url());

    let format = OutputFormat::parse(&config.output.format).unwrap_or(OutputFormat::Json);
    let pretty = config.output.pretty;

    let report = Orchestrator::new(config).run().await?;

    let stdout = io::stdout();
    let mut writer = OutputWriter::new(BufWriter::new(stdout.lock()), format, pretty);
    writer.write_report(&report)?;
    writer.flush()?;

    Ok(())
}

fn config_or_default(loaded: Result<Config, ConfigError>) -> Config {
    match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check the file at {}.",
                Config::default_path().display()
            );
            Config::default()
        }
    }
}
