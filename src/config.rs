use crate::error::{Result, SnapGeoError};
use serde::{Deserialize, Serialize};
use snapgeo_common::{Cascade, FragmentPolicy, Gazetteer, GeoBounds, LocationHint};
use std::path::{Path, PathBuf};

pub const ENV_TESSERACT: &str = "SNAPGEO_TESSERACT";
pub const ENV_TESSDATA: &str = "TESSDATA_PREFIX";
pub const ENV_LANG: &str = "SNAPGEO_LANG";
pub const ENV_WORKERS: &str = "SNAPGEO_WORKERS";
pub const ENV_TIMEOUT: &str = "SNAPGEO_TIMEOUT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 未設定なら PATH 上の `tesseract`
    pub tesseract_path: Option<PathBuf>,
    pub tessdata_dir: Option<PathBuf>,
    pub language: String,
    /// 認識の並列数（CPUコア数を超えないこと）
    pub max_workers: usize,
    pub request_timeout_seconds: u64,
    pub bounds: GeoBounds,
    /// 組み込みの地名表に追加する地名
    pub extra_locations: Vec<LocationHint>,
    pub fragment_policy: FragmentPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            tessdata_dir: None,
            language: "eng".into(),
            max_workers: default_workers(),
            request_timeout_seconds: 120,
            bounds: GeoBounds::default(),
            extra_locations: Vec::new(),
            fragment_policy: FragmentPolicy::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl Config {
    /// 設定ファイルを読み、環境変数で上書きする
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SnapGeoError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("snapgeo").join("config.json"))
    }

    /// 環境変数による上書き（`lookup` はテストで差し替える）
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_TESSERACT).filter(|v| !v.is_empty()) {
            self.tesseract_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup(ENV_TESSDATA).filter(|v| !v.is_empty()) {
            self.tessdata_dir = Some(PathBuf::from(dir));
        }
        if let Some(lang) = lookup(ENV_LANG).filter(|v| !v.is_empty()) {
            self.language = lang;
        }
        if let Some(workers) = lookup(ENV_WORKERS) {
            self.max_workers = workers.trim().parse().map_err(|_| {
                SnapGeoError::Config(format!("{} が数値ではありません: {}", ENV_WORKERS, workers))
            })?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            self.request_timeout_seconds = timeout.trim().parse().map_err(|_| {
                SnapGeoError::Config(format!("{} が数値ではありません: {}", ENV_TIMEOUT, timeout))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(SnapGeoError::Config("max_workers は1以上にしてください".into()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(SnapGeoError::Config(
                "request_timeout_seconds は1以上にしてください".into(),
            ));
        }
        if self.fragment_policy.min_digits == 0 || self.fragment_policy.min_sources == 0 {
            return Err(SnapGeoError::Config("fragment_policy の値は1以上にしてください".into()));
        }
        self.bounds.validate()?;
        Ok(())
    }

    /// 座標解決の設定一式
    pub fn cascade(&self) -> Result<Cascade> {
        self.bounds.validate()?;
        let gazetteer = Gazetteer::with_extra(&self.extra_locations)?;
        Ok(Cascade::new(self.bounds, gazetteer, self.fragment_policy))
    }

    pub fn set_tesseract_path(&mut self, path: PathBuf) -> Result<()> {
        self.tesseract_path = Some(path);
        self.save()
    }

    pub fn set_max_workers(&mut self, workers: usize) -> Result<()> {
        self.max_workers = workers;
        self.validate()?;
        self.save()
    }
}
