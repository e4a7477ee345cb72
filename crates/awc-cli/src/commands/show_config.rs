//! Prints the effective configuration after every layer is applied.

use std::io::Write;

use anyhow::{Context, Result};

use super::clean::write_json;
use crate::Config;

pub fn run(config: &Config, out: &mut impl Write) -> Result<()> {
    let value = serde_json::to_value(config).context("failed to serialize configuration")?;
    write_json(out, &value, true)
}
