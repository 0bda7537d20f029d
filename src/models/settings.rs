use serde::{Deserialize, Serialize};

/// User configuration from `cvfolio Data/Settings.yaml`.
///
/// All fields have defaults, so a missing or partial file is fine. The export
/// block mirrors the fixed reference configuration; it is read here so the
/// values live in one place, but it is intentionally not exposed in the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "Folio_Settings")]
    pub folio_settings: FolioSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolioSettings {
    /// Start the session in the dark color scheme.
    #[serde(rename = "Dark Mode", default)]
    pub dark_mode: bool,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    /// Default file name offered by the save dialog.
    #[serde(rename = "Export File Name", default = "default_export_file_name")]
    pub export_file_name: String,

    /// Page margin in inches on all four sides.
    #[serde(rename = "Export Margin Inches", default = "default_export_margin")]
    pub export_margin_in: f32,

    /// JPEG quality (1-100) for the rasterized page strips.
    #[serde(rename = "Export JPEG Quality", default = "default_export_quality")]
    pub export_jpeg_quality: u8,

    /// Raster upscale factor applied before conversion. Higher is sharper
    /// output at higher memory and time cost.
    #[serde(rename = "Export Raster Scale", default = "default_export_scale")]
    pub export_raster_scale: u32,
}

impl Default for FolioSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            debug_mode: false,
            export_file_name: default_export_file_name(),
            export_margin_in: default_export_margin(),
            export_jpeg_quality: default_export_quality(),
            export_raster_scale: default_export_scale(),
        }
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            folio_settings: FolioSettings::default(),
        }
    }
}

fn default_export_file_name() -> String {
    "Resume.pdf".to_string()
}

fn default_export_margin() -> f32 {
    0.2
}

fn default_export_quality() -> u8 {
    98
}

fn default_export_scale() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folio_settings_defaults() {
        let settings = FolioSettings::default();
        assert!(!settings.dark_mode);
        assert_eq!(settings.export_file_name, "Resume.pdf");
        assert_eq!(settings.export_jpeg_quality, 98);
        assert_eq!(settings.export_raster_scale, 2);
        assert!((settings.export_margin_in - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
Folio_Settings:
  Dark Mode: true
"#;
        let settings: UserSettings = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(settings.folio_settings.dark_mode);
        assert_eq!(settings.folio_settings.export_jpeg_quality, 98);
    }
}
