use std::path::{Path, PathBuf};

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	#[serde(default)]
	pub general: GeneralConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct GeneralConfig {
	pub api_root: Option<String>,
	pub output_dir: Option<PathBuf>,
}

impl Config {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ()> {
		let path = path.as_ref();
		let data = std::fs::read_to_string(path)
			.map_err(|e| log::error!("Failed to read configuration file: {}: {e}", path.display()))?;
		let config = toml::from_str(&data)
			.map_err(|e| log::error!("Failed to parse configuration file: {}: {e}", path.display()))?;
		Ok(config)
	}
}
