//! CLI command implementations.

pub mod dispatch;

use anyhow::Result;
use tollgate_config::load_trigger_config;

pub fn validate(path: &str) -> Result<()> {
    match load_trigger_config(path) {
        Ok(config) => {
            println!("Configuration is valid");
            for repo in config.repos() {
                println!(
                    "  {}: {} presubmit(s)",
                    repo.full_name(),
                    repo.presubmits.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
