use crate::models::{ResumeRecord, UserSettings};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// The résumé record compiled into the binary.
///
/// This is the default data source; a `Resume.yaml` in the config directory
/// overrides it without rebuilding.
const EMBEDDED_RESUME: &str = include_str!("../../data/resume.yaml");

/// Configuration manager for the data record and user settings.
///
/// Manages two YAML files in the config directory:
/// - `Resume.yaml`: optional override of the embedded résumé record
/// - `Settings.yaml`: user preferences (initial theme, export options)
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    resume_path: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files
    ///   (e.g. "cvfolio Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            resume_path: config_dir.join("Resume.yaml"),
            settings_path: config_dir.join("Settings.yaml"),
            config_dir,
        })
    }

    /// Load the résumé record.
    ///
    /// Prefers `Resume.yaml` in the config directory; falls back to the
    /// record embedded at compile time. A present-but-malformed override is
    /// an error rather than a silent fallback, so editing mistakes surface.
    pub fn load_resume(&self) -> Result<ResumeRecord> {
        if self.resume_path.exists() {
            let file_contents = fs::read_to_string(&self.resume_path)
                .with_context(|| format!("Failed to read résumé file: {}", self.resume_path))?;

            let record: ResumeRecord = serde_yaml_ng::from_str(&file_contents)
                .with_context(|| format!("Failed to parse résumé file: {}", self.resume_path))?;

            tracing::info!("Loaded résumé override from {}", self.resume_path);
            return Ok(record);
        }

        let record: ResumeRecord = serde_yaml_ng::from_str(EMBEDDED_RESUME)
            .context("Failed to parse embedded résumé record")?;

        tracing::info!("Loaded embedded résumé record");
        Ok(record)
    }

    /// Load the user settings file.
    ///
    /// # Returns
    /// The loaded UserSettings, or defaults if the file doesn't exist
    pub fn load_settings(&self) -> Result<UserSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(UserSettings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: UserSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save the user settings file.
    pub fn save_settings(&self, settings: &UserSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// The configuration directory this manager operates on.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in_temp_dir() -> (TempDir, ConfigManager) {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(dir.join("cvfolio Data")).unwrap();
        (temp, manager)
    }

    #[test]
    fn test_creates_config_directory() {
        let (_temp, manager) = manager_in_temp_dir();
        assert!(manager.config_dir().exists());
    }

    #[test]
    fn test_embedded_resume_parses() {
        let (_temp, manager) = manager_in_temp_dir();
        let record = manager.load_resume().unwrap();

        assert!(!record.personal_info.name.is_empty());
        assert!(!record.skills.is_empty());
        assert!(!record.work_experience.is_empty());
        assert!(!record.certifications.is_empty());
        assert!(!record.projects.is_empty());
    }

    #[test]
    fn test_resume_override_takes_precedence() {
        let (_temp, manager) = manager_in_temp_dir();

        let yaml = r#"
personal_info:
  name: Override Name
  title: Override Title
"#;
        fs::write(manager.config_dir().join("Resume.yaml"), yaml).unwrap();

        let record = manager.load_resume().unwrap();
        assert_eq!(record.personal_info.name, "Override Name");
    }

    #[test]
    fn test_malformed_override_is_an_error() {
        let (_temp, manager) = manager_in_temp_dir();

        fs::write(manager.config_dir().join("Resume.yaml"), "{not yaml: [").unwrap();

        assert!(manager.load_resume().is_err());
    }

    #[test]
    fn test_missing_settings_yields_defaults() {
        let (_temp, manager) = manager_in_temp_dir();
        let settings = manager.load_settings().unwrap();

        assert!(!settings.folio_settings.dark_mode);
        assert_eq!(settings.folio_settings.export_file_name, "Resume.pdf");
    }

    #[test]
    fn test_settings_round_trip() {
        let (_temp, manager) = manager_in_temp_dir();

        let mut settings = UserSettings::default();
        settings.folio_settings.dark_mode = true;
        settings.folio_settings.export_raster_scale = 3;

        manager.save_settings(&settings).unwrap();
        let loaded = manager.load_settings().unwrap();

        assert!(loaded.folio_settings.dark_mode);
        assert_eq!(loaded.folio_settings.export_raster_scale, 3);
    }
}
