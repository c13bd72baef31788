use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HomepageSection {
    pub id: Uuid,
    pub section_key: String,
    pub section_type: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub description_sk: Option<String>,
    pub badge_text: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub content: Value,
    pub is_active: bool,
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SectionInput {
    pub section_key: String,
    pub section_type: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub description_sk: Option<String>,
    pub badge_text: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    #[serde(default = "empty_object")]
    pub content: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Banner {
    pub id: Uuid,
    pub name: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub placement: String,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort_order: i32,
}

impl Banner {
    /// Active and inside its optional scheduling window.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date.map_or(true, |start| start <= now)
            && self.end_date.map_or(true, |end| end >= now)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BannerInput {
    pub name: String,
    pub title_sk: Option<String>,
    pub subtitle_sk: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub placement: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentBlock {
    pub id: Uuid,
    pub block_key: String,
    pub block_type: String,
    pub title_sk: Option<String>,
    pub content: Value,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContentBlockInput {
    pub block_type: String,
    pub title_sk: Option<String>,
    #[serde(default = "empty_object")]
    pub content: Value,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn default_active() -> bool {
    true
}

fn require_key(key: &str, what: &str) -> Result<String, DomainError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(DomainError::invalid(format!("{what} is required")));
    }
    Ok(key.to_string())
}

impl SectionInput {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.section_key = require_key(&self.section_key, "section_key")?;
        self.section_type = require_key(&self.section_type, "section_type")?;
        Ok(self)
    }
}

impl BannerInput {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.name = require_key(&self.name, "name")?;
        self.placement = require_key(&self.placement, "placement")?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(DomainError::invalid("end_date must not precede start_date"));
            }
        }
        Ok(self)
    }
}

impl ContentBlockInput {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.block_type = require_key(&self.block_type, "block_type")?;
        Ok(self)
    }
}

pub fn validate_block_key(key: &str) -> Result<String, DomainError> {
    require_key(key, "block_key")
}

/// Homepage payload: sections and content blocks keyed for the storefront.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Homepage {
    pub sections: BTreeMap<String, HomepageSection>,
    pub content_blocks: BTreeMap<String, ContentBlock>,
}

impl Homepage {
    /// Inactive entries are dropped; sections are taken in sort order so a
    /// duplicate key keeps the first one.
    pub fn assemble(mut sections: Vec<HomepageSection>, blocks: Vec<ContentBlock>) -> Self {
        sections.sort_by_key(|s| s.sort_order);
        let mut by_key = BTreeMap::new();
        for section in sections.into_iter().filter(|s| s.is_active) {
            by_key.entry(section.section_key.clone()).or_insert(section);
        }
        Homepage {
            sections: by_key,
            content_blocks: blocks
                .into_iter()
                .filter(|b| b.is_active)
                .map(|b| (b.block_key.clone(), b))
                .collect(),
        }
    }
}
