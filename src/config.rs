use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

use crate::llm::anthropic;
use crate::persona::{ModelIdentity, Persona};

pub const DEFAULT_BIND: &str = "0.0.0.0:8001";
const DEFAULT_SERVICE_NAME: &str = "Claude for Mayor API";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Deserialize, Debug)]
pub struct Environment {
    pub anthropic_api_key: String,
    #[serde(default)]
    pub anthropic_base_url: Option<String>,
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "transparency-hub",
    about = "Persona-routed political Q&A and fact-checking service"
)]
pub struct Args {
    /// Path to TOML configuration file
    #[structopt(short = "c", long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[structopt(short, long)]
    pub bind: Option<String>,

    /// Directory holding persisted chats and fact checks
    #[structopt(long)]
    pub store_dir: Option<PathBuf>,

    /// Keep records in memory only, ignoring any store directory
    #[structopt(long)]
    pub ephemeral: bool,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub bind: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub service_name: String,
    pub model: ModelConfig,
    pub personas: HashMap<Persona, String>,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: None,
            store_dir: None,
            service_name: DEFAULT_SERVICE_NAME.to_owned(),
            model: ModelConfig::default(),
            personas: HashMap::new(),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub name: String,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: anthropic::PROVIDER.to_owned(),
            name: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ModelConfig {
    pub fn identity(&self) -> ModelIdentity {
        ModelIdentity {
            provider: self.provider.clone(),
            model: self.name.clone(),
        }
    }
}

impl Config {
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).context("Failed to parse config TOML")
    }
}
