// View models - the pure projection from the résumé record to what the page
// shows.
//
// This layer is deliberately free of Slint types so the renderer contract is
// unit-testable: one block per list entry, in stored order, with optional
// sub-elements present exactly when the corresponding record field is set.
// An absent field contributes nothing - no empty rows, no dangling labels.
// The controller turns these into the generated Slint row structs.

use crate::models::{
    CertificationEntry, EducationEntry, PersonalInfo, ProjectEntry, ResumeRecord, SkillCategory,
    WorkExperienceEntry,
};

/// Everything the page renders, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageVm {
    pub header: HeaderVm,
    pub summary: String,
    pub skills: Vec<SkillColumnVm>,
    pub experience: Vec<ExperienceVm>,
    pub education: Vec<EducationVm>,
    pub certifications: Vec<CertificationVm>,
    pub projects: Vec<ProjectVm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderVm {
    pub name: String,
    pub title: String,
    pub tagline: String,
    pub contacts: Vec<ContactVm>,
}

/// One contact line in the header; only present for non-empty record fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactVm {
    /// Icon identifier understood by the markup ("location", "phone",
    /// "email", "github", "linkedin").
    pub icon: String,
    pub text: String,
    /// Present when the contact is clickable.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillColumnVm {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceVm {
    pub position: String,
    pub company: String,
    pub period: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationVm {
    pub degree: String,
    pub institution: String,
    pub period: String,
    /// Diploma scan; the thumbnail is rendered only when present.
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificationVm {
    pub name: String,
    /// Issuer and date joined into one line ("issuer · date"); empty parts
    /// are omitted rather than leaving separators behind.
    pub meta_line: String,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectVm {
    pub title: String,
    pub technologies: String,
    pub description: String,
    pub role: Option<String>,
    pub impact: Option<String>,
    pub links: Vec<LinkVm>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkVm {
    pub label: String,
    pub url: String,
}

/// Project the full record. Each `Vec` keeps the record's stored order.
pub fn project_page(record: &ResumeRecord) -> PageVm {
    PageVm {
        header: header_vm(&record.personal_info),
        summary: record.professional_summary.clone(),
        skills: record.skills.iter().map(skill_vm).collect(),
        experience: record.work_experience.iter().map(experience_vm).collect(),
        education: record.education.iter().map(education_vm).collect(),
        certifications: record.certifications.iter().map(certification_vm).collect(),
        projects: record.projects.iter().map(project_vm).collect(),
    }
}

fn header_vm(info: &PersonalInfo) -> HeaderVm {
    let mut contacts = Vec::new();

    let mut push = |icon: &str, text: &str, url: Option<String>| {
        if !text.is_empty() {
            contacts.push(ContactVm {
                icon: icon.to_string(),
                text: text.to_string(),
                url,
            });
        }
    };

    push("location", &info.address, None);
    push("phone", &info.phone, None);
    push("email", &info.email, None);
    push(
        "github",
        &info.github,
        non_empty(&info.github).map(|g| ensure_https(&g)),
    );
    push(
        "linkedin",
        &info.linkedin,
        non_empty(&info.linkedin).map(|l| ensure_https(&l)),
    );

    HeaderVm {
        name: info.name.clone(),
        title: info.title.clone(),
        tagline: info.tagline.clone(),
        contacts,
    }
}

fn skill_vm(category: &SkillCategory) -> SkillColumnVm {
    SkillColumnVm {
        category: category.category.clone(),
        items: category.items.clone(),
    }
}

fn experience_vm(entry: &WorkExperienceEntry) -> ExperienceVm {
    ExperienceVm {
        position: entry.position.clone(),
        company: entry.company.clone(),
        period: entry.period.clone(),
        responsibilities: entry.responsibilities.clone(),
    }
}

fn education_vm(entry: &EducationEntry) -> EducationVm {
    EducationVm {
        degree: entry.degree.clone(),
        institution: entry.institution.clone(),
        period: entry.period.clone(),
        thumbnail: entry.image.clone(),
    }
}

fn certification_vm(entry: &CertificationEntry) -> CertificationVm {
    let meta_line = [entry.issuer.as_str(), entry.date.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" · ");

    CertificationVm {
        name: entry.name.clone(),
        meta_line,
        credential_id: entry.credential_id.clone(),
        credential_url: entry.credential_url.clone(),
        thumbnail: entry.image.clone(),
    }
}

fn project_vm(entry: &ProjectEntry) -> ProjectVm {
    let mut links = Vec::new();
    if let Some(url) = &entry.live_url {
        links.push(LinkVm {
            label: "Live".to_string(),
            url: url.clone(),
        });
    }
    if let Some(url) = &entry.github_url {
        links.push(LinkVm {
            label: "GitHub".to_string(),
            url: url.clone(),
        });
    }

    ProjectVm {
        title: entry.title.clone(),
        technologies: entry.technologies.clone(),
        description: entry.description.clone(),
        role: entry.role.clone(),
        impact: entry.impact.clone(),
        links,
        thumbnail: entry.image.clone(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn ensure_https(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ResumeRecord {
        serde_yaml_ng::from_str(
            r#"
personal_info:
  name: Jane Doe
  title: Engineer
  address: Somewhere
  email: jane@example.com
professional_summary: A summary.
skills:
  - category: Alpha
    items: [one, two]
  - category: Beta
    items: [three]
work_experience:
  - position: Dev
    company: Acme
    period: 2020-2021
    responsibilities: [built things, shipped things]
education:
  - degree: BSc
    institution: Uni
    period: "2019"
  - degree: Diploma
    institution: College
    period: "2017"
    image: assets/diploma.jpg
certifications:
  - name: Cert A
    issuer: Org
    date: "2021"
    credential_id: A-1
    image: assets/a.jpg
  - name: Cert B
    issuer: Org
    date: "2022"
projects:
  - title: Full Project
    technologies: Rust
    description: Did it all.
    role: Lead
    impact: Big
    image: assets/full.png
    github_url: https://example.com/repo
  - title: Bare Project
    description: Minimal.
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_one_block_per_entry_in_stored_order() {
        let page = project_page(&sample_record());

        let skill_names: Vec<&str> = page.skills.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(skill_names, vec!["Alpha", "Beta"]);

        assert_eq!(page.experience.len(), 1);
        assert_eq!(page.education.len(), 2);
        assert_eq!(page.certifications.len(), 2);
        assert_eq!(page.projects.len(), 2);

        let project_titles: Vec<&str> =
            page.projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(project_titles, vec!["Full Project", "Bare Project"]);
    }

    #[test]
    fn test_optional_thumbnails_present_iff_set() {
        let page = project_page(&sample_record());

        assert!(page.education[0].thumbnail.is_none());
        assert_eq!(
            page.education[1].thumbnail.as_deref(),
            Some("assets/diploma.jpg")
        );

        assert!(page.certifications[0].thumbnail.is_some());
        assert!(page.certifications[1].thumbnail.is_none());
    }

    #[test]
    fn test_optional_project_fields_absent_for_bare_entry() {
        let page = project_page(&sample_record());
        let bare = &page.projects[1];

        assert!(bare.role.is_none());
        assert!(bare.impact.is_none());
        assert!(bare.links.is_empty());
        assert!(bare.thumbnail.is_none());

        let full = &page.projects[0];
        assert_eq!(full.role.as_deref(), Some("Lead"));
        assert_eq!(full.links.len(), 1);
        assert_eq!(full.links[0].label, "GitHub");
    }

    #[test]
    fn test_header_contacts_only_for_populated_fields() {
        let page = project_page(&sample_record());
        let icons: Vec<&str> = page
            .header
            .contacts
            .iter()
            .map(|c| c.icon.as_str())
            .collect();

        // Phone, github and linkedin were empty in the record
        assert_eq!(icons, vec!["location", "email"]);
    }

    #[test]
    fn test_certification_meta_line_skips_empty_parts() {
        let entry = CertificationEntry {
            name: "Cert".to_string(),
            issuer: "Org".to_string(),
            date: String::new(),
            image: None,
            credential_id: None,
            credential_url: None,
        };

        let vm = certification_vm(&entry);
        assert_eq!(vm.meta_line, "Org");
    }

    #[test]
    fn test_contact_urls_get_a_scheme() {
        assert_eq!(ensure_https("github.com/x"), "https://github.com/x");
        assert_eq!(ensure_https("https://a.b"), "https://a.b");
    }

    #[test]
    fn test_embedded_record_projects_cleanly() {
        let record: ResumeRecord =
            serde_yaml_ng::from_str(include_str!("../../data/resume.yaml")).unwrap();
        let page = project_page(&record);

        assert_eq!(page.skills.len(), record.skills.len());
        assert_eq!(page.projects.len(), record.projects.len());
        assert_eq!(page.certifications.len(), record.certifications.len());
        assert!(!page.header.contacts.is_empty());
    }
}
