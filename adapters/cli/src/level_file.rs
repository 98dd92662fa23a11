use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use gem_cascade_core::{CellCoord, LevelConfig, SwapMove};
use serde::Deserialize;

/// Level description together with an optional scripted opening.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LevelFile {
    /// Level parameters handed to the engine.
    pub(crate) level: LevelConfig,
    /// Swaps replayed before any command-line swaps.
    pub(crate) script: Script,
}

/// Swaps written in `row,column>row,column` notation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Script {
    /// Swaps in the order they are requested.
    pub(crate) swaps: Vec<String>,
}

impl LevelFile {
    /// Reads and parses a TOML level file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse level file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid level toml")
    }

    /// Scripted swaps, parsed.
    pub(crate) fn swaps(&self) -> Result<Vec<SwapMove>> {
        self.script
            .swaps
            .iter()
            .map(|text| parse_swap(text).map_err(anyhow::Error::msg))
            .collect()
    }
}

/// Parses `row,column>row,column`.
pub(crate) fn parse_swap(text: &str) -> Result<SwapMove, String> {
    let (from, to) = text
        .split_once('>')
        .ok_or_else(|| format!("swap `{text}` must look like `row,column>row,column`"))?;
    Ok(SwapMove::new(parse_cell(from)?, parse_cell(to)?))
}

fn parse_cell(text: &str) -> Result<CellCoord, String> {
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|error| format!("invalid coordinate `{}`: {error}", value.trim()))
    };
    match text.split_once(',') {
        Some((row, column)) => Ok(CellCoord::new(parse(row)?, parse(column)?)),
        None => Err(format!("cell `{}` must look like `row,column`", text.trim())),
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal seed.
pub(crate) fn parse_seed(seed: &str) -> Result<u64> {
    let trimmed = seed.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    match parsed {
        Ok(value) => Ok(value),
        Err(error) => bail!("invalid seed `{trimmed}`: {error}"),
    }
}
