use serde::{Deserialize, Serialize};

/// The complete résumé record rendered by the page.
///
/// There is exactly one definition of this schema; content variants (tagline
/// wording, optional thumbnails, extra project detail) are optional fields,
/// not parallel copies of the record. The record is deserialized once at
/// startup by [`crate::config::ConfigManager`] and never mutated afterwards.
///
/// Every `Vec` field is in display order: the renderer projects entries in
/// exactly the order they appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,

    #[serde(default)]
    pub professional_summary: String,

    #[serde(default)]
    pub skills: Vec<SkillCategory>,

    #[serde(default)]
    pub work_experience: Vec<WorkExperienceEntry>,

    #[serde(default)]
    pub education: Vec<EducationEntry>,

    #[serde(default)]
    pub certifications: Vec<CertificationEntry>,

    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

/// Identity and contact block shown in the page header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,

    #[serde(default)]
    pub tagline: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub github: String,

    #[serde(default)]
    pub linkedin: String,

    #[serde(default)]
    pub age: String,

    #[serde(default)]
    pub birth_date: String,
}

/// One named group of skills (e.g. "Networking & Cybersecurity").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCategory {
    pub category: String,

    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkExperienceEntry {
    pub position: String,
    pub company: String,

    #[serde(default)]
    pub period: String,

    #[serde(default)]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,

    #[serde(default)]
    pub period: String,

    /// Optional scan of the diploma; absent entries render without a thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationEntry {
    pub name: String,
    pub issuer: String,

    #[serde(default)]
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub title: String,

    #[serde(default)]
    pub technologies: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}
