//! Probe configuration file

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use surface_engine::gl::{OfferedFormat, PixelFormatRequest};

/// What to ask for, and optionally what to pick from instead of the native platform's formats.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub request: PixelFormatRequest,
    /// Recorded driver pick, only used together with `candidates`.
    pub guess: Option<OfferedFormat>,
    pub candidates: Option<Vec<OfferedFormat>>,
}

impl ProbeConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading probe config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing probe config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
