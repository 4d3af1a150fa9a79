//! Form pages and their submissions, kept in memory

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use formtrap_common::{slugify, HoneypotConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

const DEFAULT_THANK_YOU: &str = "Thank you for your message";

/// Kind of input rendered for a form field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    SingleLine,
    Email,
    Multiline,
}

impl FieldKind {
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::SingleLine => "text",
            FieldKind::Email => "email",
            FieldKind::Multiline => "textarea",
        }
    }
}

/// A field a site editor added to a form page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: true,
        }
    }
}

/// A page that renders a form and emails/stores what comes back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormPage {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default = "default_thank_you")]
    pub thank_you_text: String,
    /// Where submission notifications go
    #[serde(default)]
    pub to_address: Option<String>,
    pub fields: Vec<FormField>,
    /// Honeypot Enabled
    #[serde(default)]
    pub honeypot: bool,
}

fn default_thank_you() -> String {
    DEFAULT_THANK_YOU.to_string()
}

impl FormPage {
    /// Demo contact form used when no forms file is configured
    pub fn demo() -> Self {
        Self {
            slug: "formpage".to_string(),
            title: "Contact us".to_string(),
            intro: "Send us a message and we will get back to you.".to_string(),
            thank_you_text: default_thank_you(),
            to_address: Some("admin@example.com".to_string()),
            fields: vec![
                FormField::new("name", "Name", FieldKind::SingleLine),
                FormField::new("email_address", "Email address", FieldKind::Email),
                FormField::new("message", "Message", FieldKind::Multiline),
            ],
            honeypot: true,
        }
    }

    /// Names of required fields that are missing or blank
    pub fn missing_required(&self, data: &BTreeMap<String, String>) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .filter(|field| {
                data.get(&field.name)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|field| field.name.clone())
            .collect()
    }

    /// Keep only the values of fields this page defines
    pub fn clean_data(&self, data: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter_map(|field| {
                data.get(&field.name)
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect()
    }
}

/// A stored (accepted) submission
#[derive(Debug, Clone, Serialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub form_slug: String,
    pub data: BTreeMap<String, String>,
    pub submitted_at: DateTime<Utc>,
}

/// In-memory form pages and submissions
#[derive(Debug, Default)]
pub struct FormStore {
    pages: DashMap<String, FormPage>,
    submissions: DashMap<String, Vec<FormSubmission>>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding only the demo form
    pub fn demo() -> Self {
        let store = Self::new();
        let page = FormPage::demo();
        store.pages.insert(page.slug.clone(), page);
        store
    }

    /// Build a store, rejecting pages whose fields reuse a honeypot marker name
    pub fn with_pages(pages: Vec<FormPage>, honeypot: &HoneypotConfig) -> Result<Self, StoreError> {
        let markers = [honeypot.name_field(), honeypot.time_field()];
        let store = Self::new();
        for page in pages {
            if page.slug.is_empty() || slugify(&page.slug) != page.slug {
                return Err(StoreError::InvalidSlug(page.slug));
            }
            if store.pages.contains_key(&page.slug) {
                return Err(StoreError::DuplicateSlug(page.slug));
            }
            if let Some(field) = page.fields.iter().find(|f| markers.contains(&f.name.as_str())) {
                return Err(StoreError::MarkerFieldName {
                    slug: page.slug.clone(),
                    field: field.name.clone(),
                });
            }
            store.pages.insert(page.slug.clone(), page);
        }
        Ok(store)
    }

    /// Load form pages from a JSON array
    pub fn load_json(path: &Path, honeypot: &HoneypotConfig) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let pages: Vec<FormPage> = serde_json::from_str(&raw)?;
        Self::with_pages(pages, honeypot)
    }

    pub fn get(&self, slug: &str) -> Option<FormPage> {
        self.pages.get(slug).map(|page| page.value().clone())
    }

    /// All pages, ordered by slug
    pub fn list(&self) -> Vec<FormPage> {
        let mut pages: Vec<FormPage> = self.pages.iter().map(|page| page.value().clone()).collect();
        pages.sort_by(|a, b| a.slug.cmp(&b.slug));
        pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Toggle the honeypot on a page, returning the updated page
    pub fn set_honeypot(&self, slug: &str, enabled: bool) -> Option<FormPage> {
        let mut page = self.pages.get_mut(slug)?;
        page.honeypot = enabled;
        Some(page.value().clone())
    }

    /// Persist a submission for an existing page
    pub fn add_submission(&self, slug: &str, data: BTreeMap<String, String>) -> Option<FormSubmission> {
        if !self.pages.contains_key(slug) {
            return None;
        }

        let submission = FormSubmission {
            id: Uuid::new_v4(),
            form_slug: slug.to_string(),
            data,
            submitted_at: Utc::now(),
        };
        self.submissions
            .entry(slug.to_string())
            .or_default()
            .push(submission.clone());
        Some(submission)
    }

    pub fn submissions(&self, slug: &str) -> Vec<FormSubmission> {
        self.submissions
            .get(slug)
            .map(|subs| subs.value().clone())
            .unwrap_or_default()
    }

    pub fn submission_count(&self, slug: &str) -> usize {
        self.submissions.get(slug).map(|subs| subs.len()).unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read forms file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid forms file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Form slug '{0}' is not a valid slug")]
    InvalidSlug(String),

    #[error("Form slug '{0}' is defined twice")]
    DuplicateSlug(String),

    #[error("Form '{slug}' has a field named '{field}', which is a honeypot marker")]
    MarkerFieldName { slug: String, field: String },
}
