//! Configuration loading with env-var overrides.
//!
//! Reads a TOML file (usually `config/default.toml`), then applies the
//! `BABBLER_LOG_LEVEL`, `BABBLER_STORAGE_PATH` and `BABBLER_BIND` overrides.
//! Every section is optional.

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::BabblerError;

/// Which `GraphStore` implementation backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
	Sqlite,
	Memory,
}

impl Backend {
	fn parse(name: &str) -> Result<Self, BabblerError> {
		match name.to_ascii_lowercase().as_str() {
			"sqlite" => Ok(Backend::Sqlite),
			"memory" => Ok(Backend::Memory),
			other => Err(BabblerError::Config(format!(
				"unknown storage backend '{other}', expected 'sqlite' or 'memory'"
			))),
		}
	}
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
	pub backend: Backend,
	/// SQLite file, or postcard snapshot file for the memory backend.
	pub path: PathBuf,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
	pub log_level: String,
	/// Fixed RNG seed; `None` seeds from the OS.
	pub rng_seed: Option<u64>,
	/// Directory of `<speaker>.txt` quote files used for backfill.
	pub quotes_dir: Option<PathBuf>,
	pub storage: StorageConfig,
	/// Socket address the HTTP front-end binds to.
	pub bind: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_level: default_log_level(),
			rng_seed: None,
			quotes_dir: None,
			storage: StorageConfig { backend: Backend::Sqlite, path: PathBuf::from(default_storage_path()) },
			bind: default_bind(),
		}
	}
}

/// Raw TOML shape: `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
	#[serde(default)]
	babbler: RawBabbler,
	#[serde(default)]
	storage: RawStorage,
	#[serde(default)]
	server: RawServer,
}

#[derive(Deserialize)]
struct RawBabbler {
	#[serde(default = "default_log_level")]
	log_level: String,
	#[serde(default)]
	rng_seed: Option<u64>,
	#[serde(default)]
	quotes_dir: Option<String>,
}

impl Default for RawBabbler {
	fn default() -> Self {
		Self { log_level: default_log_level(), rng_seed: None, quotes_dir: None }
	}
}

#[derive(Deserialize)]
struct RawStorage {
	#[serde(default = "default_backend")]
	backend: String,
	#[serde(default = "default_storage_path")]
	path: String,
}

impl Default for RawStorage {
	fn default() -> Self {
		Self { backend: default_backend(), path: default_storage_path() }
	}
}

#[derive(Deserialize)]
struct RawServer {
	#[serde(default = "default_bind")]
	bind: String,
}

impl Default for RawServer {
	fn default() -> Self {
		Self { bind: default_bind() }
	}
}

fn default_log_level() -> String {
	"info".to_owned()
}

fn default_backend() -> String {
	"sqlite".to_owned()
}

fn default_storage_path() -> String {
	"data/babbler.db".to_owned()
}

fn default_bind() -> String {
	"127.0.0.1:5000".to_owned()
}

/// Loads the config file at `path` and applies env overrides.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, BabblerError> {
	let path = path.as_ref();
	let content = fs::read_to_string(path)
		.map_err(|e| BabblerError::Config(format!("cannot read {}: {e}", path.display())))?;
	let raw = parse(&content)?;
	resolve(raw, |key| env::var(key).ok())
}

/// Loads `path` if it exists, otherwise starts from defaults. Env overrides apply either way.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config, BabblerError> {
	if path.as_ref().exists() {
		load(path)
	} else {
		resolve(RawConfig::default(), |key| env::var(key).ok())
	}
}

fn parse(content: &str) -> Result<RawConfig, BabblerError> {
	toml::from_str(content).map_err(|e| BabblerError::Config(format!("invalid TOML: {e}")))
}

fn resolve(raw: RawConfig, env: impl Fn(&str) -> Option<String>) -> Result<Config, BabblerError> {
	let log_level = env("BABBLER_LOG_LEVEL").unwrap_or(raw.babbler.log_level);
	let storage_path = env("BABBLER_STORAGE_PATH").unwrap_or(raw.storage.path);
	let bind = env("BABBLER_BIND").unwrap_or(raw.server.bind);

	if storage_path.trim().is_empty() {
		return Err(BabblerError::Config("storage path must not be empty".into()));
	}

	Ok(Config {
		log_level,
		rng_seed: raw.babbler.rng_seed,
		quotes_dir: raw.babbler.quotes_dir.map(PathBuf::from),
		storage: StorageConfig { backend: Backend::parse(&raw.storage.backend)?, path: PathBuf::from(storage_path) },
		bind,
	})
}
