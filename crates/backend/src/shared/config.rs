use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetProvider {
    #[default]
    Local,
    Cloudinary,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    #[serde(default)]
    pub provider: AssetProvider,
    /// Папка верхнего уровня в хранилище ассетов
    #[serde(default = "default_root_folder")]
    pub root_folder: String,
    #[serde(default = "default_local_dir")]
    pub local_dir: String,
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            provider: AssetProvider::Local,
            root_folder: default_root_folder(),
            local_dir: default_local_dir(),
            cloudinary: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Корень для временных каталогов распаковки архивов
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ImportConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_root_folder() -> String {
    "productos".to_string()
}

fn default_local_dir() -> String {
    "target/uploads".to_string()
}

fn default_upload_timeout() -> u64 {
    60
}

fn default_temp_dir() -> String {
    "target/tmp/imports".to_string()
}

fn default_max_upload_mb() -> usize {
    100
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
path = "target/db/catalog.db"

[assets]
provider = "local"
root_folder = "productos"
local_dir = "target/uploads"

[import]
temp_dir = "target/tmp/imports"
max_upload_mb = 100
"#;

/// Load configuration from config.toml
///
/// Search order:
/// 1. `$CONFIG_PATH`
/// 2. Next to the executable (for production)
/// 3. Current working directory
/// 4. Embedded default config
///
/// `PORT` overrides `server.port`.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = match find_config_file() {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str::<Config>(&contents)?
        }
        None => {
            tracing::info!("Using default embedded configuration");
            toml::from_str::<Config>(DEFAULT_CONFIG)?
        }
    };

    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?;
    }

    Ok(config)
}

fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    let exe_candidate = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("config.toml")));
    let cwd_candidate = Some(PathBuf::from("config.toml"));

    [exe_candidate, cwd_candidate]
        .into_iter()
        .flatten()
        .find(|p| p.exists())
}

/// Сохранить конфигурацию для глобального доступа (вызывается один раз в main)
pub fn init_config(config: Config) -> anyhow::Result<&'static Config> {
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Config has already been initialized"))?;
    Ok(get_config())
}

pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config has not been initialized")
}

/// Resolve a configured path: absolute paths as is, relative ones
/// against the current working directory.
pub fn resolve_path(path: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(path);
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(p))
}
