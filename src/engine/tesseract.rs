use super::{RecognitionConfig, TextRecognizer};
use crate::config::Config;
use crate::error::{Result, SnapGeoError};
use crate::variant::ImageVariant;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

/// Tesseract をコマンドとして呼び出す
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    pub executable: PathBuf,
    pub tessdata_dir: Option<PathBuf>,
    pub language: String,
}

impl TesseractEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            tessdata_dir: None,
            language: "eng".into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            executable: config
                .tesseract_path
                .clone()
                .unwrap_or_else(|| PathBuf::from("tesseract")),
            tessdata_dir: config.tessdata_dir.clone(),
            language: config.language.clone(),
        }
    }
}

impl TextRecognizer for TesseractEngine {
    fn check_available(&self) -> Result<()> {
        let output = Command::new(&self.executable).arg("--version").output().map_err(|e| {
            SnapGeoError::EngineUnavailable(format!("{}: {}", self.executable.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnapGeoError::EngineUnavailable(format!(
                "{} --version failed (code {:?}): {}",
                self.executable.display(),
                output.status.code(),
                stderr.trim()
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        debug!(version = version.lines().next().unwrap_or(""), "tesseract detected");
        Ok(())
    }

    fn recognize(&self, variant: &ImageVariant, config: &RecognitionConfig) -> Result<String> {
        // 画像を一時ファイルに書き出してから渡す
        let input = NamedTempFile::with_suffix(".png")?;
        variant
            .image
            .save(input.path())
            .map_err(|e| SnapGeoError::MalformedImage(e.to_string()))?;

        let mut command = Command::new(&self.executable);
        command.arg(input.path()).arg("stdout");
        if let Some(dir) = &self.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }
        let output = command.arg("-l").arg(&self.language).args(config.args()).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnapGeoError::Recognition(format!(
                "tesseract failed on {}_{} (code {:?}): {}",
                variant.label,
                config.label,
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults() {
        let engine = TesseractEngine::from_config(&Config::default());
        assert_eq!(engine.executable, PathBuf::from("tesseract"));
        assert_eq!(engine.language, "eng");
        assert!(engine.tessdata_dir.is_none());
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let engine = TesseractEngine::new("/nonexistent/bin/tesseract-snapgeo");
        let err = engine.check_available().unwrap_err();
        assert!(matches!(err, SnapGeoError::EngineUnavailable(_)));
    }
}
