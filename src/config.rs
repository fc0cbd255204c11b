//! Service configuration: optional TOML file (QUIZ_CONFIG_PATH) overridden by env vars.
//!
//! TOML schema (every section optional):
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 5000
//!
//! [auth]
//! admin_password = "..."
//! token_ttl_secs = 28800   # 0 = never expire
//!
//! [scoring]
//! scale = "linear"         # or "banded"
//! expose_answers = false   # anonymous GET /questions includes correct_answer
//!
//! [storage]
//! data_path = "data/questions.json"
//!
//! [[questions]]
//! id = "intro-1"           # optional
//! statement = "..."
//! correct_answer = "..."
//! ```

use std::{
  net::{IpAddr, Ipv4Addr, SocketAddr},
  path::PathBuf,
  time::Duration,
};

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::scorer::ScoreScale;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 8 * 60 * 60;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct FileConfig {
  #[serde(default)] pub server: ServerCfg,
  #[serde(default)] pub auth: AuthCfg,
  #[serde(default)] pub scoring: ScoringCfg,
  #[serde(default)] pub storage: StorageCfg,
  #[serde(default)] pub questions: Vec<QuestionCfg>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ServerCfg {
  #[serde(default)] pub bind_addr: Option<IpAddr>,
  #[serde(default)] pub port: Option<u16>,
}

#[derive(Clone, Deserialize, Default)]
pub struct AuthCfg {
  #[serde(default)] pub admin_password: Option<String>,
  #[serde(default)] pub token_ttl_secs: Option<u64>,
}

impl std::fmt::Debug for AuthCfg {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AuthCfg")
      .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
      .field("token_ttl_secs", &self.token_ttl_secs)
      .finish()
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ScoringCfg {
  #[serde(default)] pub scale: Option<ScoreScale>,
  #[serde(default)] pub expose_answers: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StorageCfg {
  #[serde(default)] pub data_path: Option<PathBuf>,
}

/// Seed question accepted in TOML. Without an id, one is generated at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)] pub id: Option<String>,
  pub statement: String,
  pub correct_answer: String,
}

/// Fully resolved settings the server runs with.
#[derive(Clone)]
pub struct ServiceConfig {
  pub addr: SocketAddr,
  pub admin_password: String,
  pub token_ttl: Option<Duration>,
  pub scale: ScoreScale,
  pub expose_answers: bool,
  pub data_path: Option<PathBuf>,
  pub seed_questions: Vec<QuestionCfg>,
}

impl std::fmt::Debug for ServiceConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServiceConfig")
      .field("addr", &self.addr)
      .field("token_ttl", &self.token_ttl)
      .field("scale", &self.scale)
      .field("expose_answers", &self.expose_answers)
      .field("data_path", &self.data_path)
      .field("seed_questions", &self.seed_questions.len())
      .finish_non_exhaustive()
  }
}

impl ServiceConfig {
  /// Defaults for everything except the password. Handy for tests and embedding.
  pub fn with_password(admin_password: impl Into<String>) -> Self {
    Self {
      addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
      admin_password: admin_password.into(),
      token_ttl: Some(Duration::from_secs(DEFAULT_TOKEN_TTL_SECS)),
      scale: ScoreScale::default(),
      expose_answers: false,
      data_path: None,
      seed_questions: Vec::new(),
    }
  }

  /// Load QUIZ_CONFIG_PATH (if set) and apply env overrides.
  pub fn from_env() -> Result<Self, ConfigError> {
    let file = match std::env::var("QUIZ_CONFIG_PATH") {
      Ok(path) => load_file(&path)?,
      Err(_) => FileConfig::default(),
    };
    resolve(file, |key| std::env::var(key).ok())
  }
}

pub fn load_file(path: &str) -> Result<FileConfig, ConfigError> {
  let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
  let cfg = toml::from_str::<FileConfig>(&raw).map_err(|source| ConfigError::Parse { path: path.to_string(), source })?;
  info!(target: "quiz_backend", %path, seed_questions = cfg.questions.len(), "Loaded service config (TOML)");
  Ok(cfg)
}

fn parse_env<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
  raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue { key, value: raw })
}

/// Merge file values with env lookups; env wins.
pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<ServiceConfig, ConfigError> {
  let ip = match env("BIND_ADDR") {
    Some(v) => parse_env::<IpAddr>("BIND_ADDR", v)?,
    None => file.server.bind_addr.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
  };
  let port = match env("PORT") {
    Some(v) => parse_env::<u16>("PORT", v)?,
    None => file.server.port.unwrap_or(DEFAULT_PORT),
  };

  let admin_password = env("ADMIN_PASSWORD")
    .or(file.auth.admin_password)
    .filter(|p| !p.is_empty())
    .ok_or(ConfigError::MissingAdminPassword)?;

  let ttl_secs = match env("TOKEN_TTL_SECS") {
    Some(v) => parse_env::<u64>("TOKEN_TTL_SECS", v)?,
    None => file.auth.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
  };
  let token_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

  let scale = match env("SCORE_SCALE") {
    Some(v) => v.parse::<ScoreScale>().map_err(|_| ConfigError::InvalidValue { key: "SCORE_SCALE", value: v })?,
    None => file.scoring.scale.unwrap_or_default(),
  };
  let expose_answers = match env("EXPOSE_ANSWERS") {
    Some(v) => parse_env::<bool>("EXPOSE_ANSWERS", v)?,
    None => file.scoring.expose_answers.unwrap_or(false),
  };

  let data_path = env("QUIZ_DATA_PATH").map(PathBuf::from).or(file.storage.data_path);

  Ok(ServiceConfig {
    addr: SocketAddr::new(ip, port),
    admin_password,
    token_ttl,
    scale,
    expose_answers,
    data_path,
    seed_questions: file.questions,
  })
}
