use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub device_id: Uuid,

    /// Name recorded as `entered_by` on every row.
    ///
    /// Configs written before this field existed get a name derived from
    /// `device_id` the first time they are loaded.
    #[serde(default)]
    pub operator: Option<String>,

    /// Symbol prefixed to expense amounts in stats output.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        let device_id = Uuid::new_v4();
        Self {
            device_id,
            operator: Some(operator_name_from_uuid(device_id)),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl AppConfig {
    pub fn operator_name(&self) -> String {
        self.operator
            .clone()
            .unwrap_or_else(|| operator_name_from_uuid(self.device_id))
    }
}

pub fn operator_name_from_uuid(id: Uuid) -> String {
    // Uuid bytes index into fixed word lists, so a given device id always
    // maps to the same operator name. The lists must not be reordered.
    const ADJ: &[&str] = &[
        "quick", "calm", "bright", "steady", "neat", "sunny", "bold", "quiet", "eager", "lively",
        "patient", "cheery", "sharp", "gentle", "prompt", "tidy",
    ];
    const NOUN: &[&str] = &[
        "sparrow",
        "myna",
        "heron",
        "kingfisher",
        "bulbul",
        "parrot",
        "crane",
        "peacock",
        "robin",
        "hoopoe",
        "lark",
        "oriole",
        "dove",
        "finch",
        "sunbird",
        "swift",
    ];

    let b = id.as_bytes();
    let a = u16::from_le_bytes([b[0], b[1]]) as usize;
    let n = u16::from_le_bytes([b[2], b[3]]) as usize;

    format!("{}_{}", ADJ[a % ADJ.len()], NOUN[n % NOUN.len()])
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

pub fn app_paths(override_home: Option<PathBuf>) -> Result<AppPaths> {
    if let Some(home) = override_home {
        return Ok(AppPaths {
            config_dir: home.join("config"),
            data_dir: home.join("data"),
        });
    }

    let proj = ProjectDirs::from("com", "godown", "godown")
        .context("Failed to resolve platform directories")?;

    Ok(AppPaths {
        config_dir: proj.config_dir().to_path_buf(),
        data_dir: proj.data_dir().to_path_buf(),
    })
}

pub fn load_or_init_config(paths: &AppPaths) -> Result<(AppConfig, PathBuf)> {
    fs::create_dir_all(&paths.config_dir)
        .with_context(|| format!("Failed to create config dir {}", paths.config_dir.display()))?;

    let cfg_path = paths.config_dir.join("config.json");
    if !cfg_path.exists() {
        let cfg = AppConfig::default();
        write_config(&cfg_path, &cfg)?;
        return Ok((cfg, cfg_path));
    }

    let raw = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Failed to read {}", cfg_path.display()))?;
    let mut cfg: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", cfg_path.display()))?;

    // Backfill fields missing from older config files.
    let mut changed = false;
    if cfg.operator.is_none() {
        cfg.operator = Some(operator_name_from_uuid(cfg.device_id));
        changed = true;
    }
    if cfg.currency_symbol.is_empty() {
        cfg.currency_symbol = default_currency_symbol();
        changed = true;
    }
    if changed {
        write_config(&cfg_path, &cfg)?;
    }

    Ok((cfg, cfg_path))
}

pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
