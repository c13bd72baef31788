use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cms::{
    validate_block_key, Banner, BannerInput, ContentBlock, ContentBlockInput, Homepage, HomepageSection,
    SectionInput,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CmsRepository;

pub struct CmsService<R> {
    repo: R,
}

impl<R: CmsRepository> CmsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn homepage(&self) -> Result<Homepage, DomainError> {
        Ok(Homepage::assemble(self.repo.sections()?, self.repo.content_blocks()?))
    }

    /// Banners currently on air for `placement`.
    pub fn live_banners(&self, placement: Option<&str>, now: DateTime<Utc>) -> Result<Vec<Banner>, DomainError> {
        let mut banners: Vec<Banner> = self
            .repo
            .banners(placement)?
            .into_iter()
            .filter(|b| b.is_live(now))
            .collect();
        banners.sort_by_key(|b| b.sort_order);
        Ok(banners)
    }

    // ── Sections ─────────────────────────────────────────────────────────────

    pub fn sections(&self) -> Result<Vec<HomepageSection>, DomainError> {
        self.repo.sections()
    }

    pub fn create_section(&self, input: SectionInput) -> Result<HomepageSection, DomainError> {
        self.repo.create_section(input.validate()?)
    }

    pub fn update_section(&self, id: Uuid, input: SectionInput) -> Result<HomepageSection, DomainError> {
        self.repo
            .update_section(id, input.validate()?)?
            .ok_or(DomainError::NotFound("Section"))
    }

    pub fn delete_section(&self, id: Uuid) -> Result<(), DomainError> {
        found(self.repo.delete_section(id)?, "Section")
    }

    // ── Banners ──────────────────────────────────────────────────────────────

    pub fn banners(&self) -> Result<Vec<Banner>, DomainError> {
        self.repo.banners(None)
    }

    pub fn create_banner(&self, input: BannerInput) -> Result<Banner, DomainError> {
        self.repo.create_banner(input.validate()?)
    }

    pub fn update_banner(&self, id: Uuid, input: BannerInput) -> Result<Banner, DomainError> {
        self.repo
            .update_banner(id, input.validate()?)?
            .ok_or(DomainError::NotFound("Banner"))
    }

    pub fn delete_banner(&self, id: Uuid) -> Result<(), DomainError> {
        found(self.repo.delete_banner(id)?, "Banner")
    }

    // ── Content blocks ───────────────────────────────────────────────────────

    pub fn content_blocks(&self) -> Result<Vec<ContentBlock>, DomainError> {
        self.repo.content_blocks()
    }

    pub fn upsert_content_block(&self, key: &str, input: ContentBlockInput) -> Result<ContentBlock, DomainError> {
        let key = validate_block_key(key)?;
        self.repo.upsert_content_block(&key, input.validate()?)
    }

    pub fn delete_content_block(&self, key: &str) -> Result<(), DomainError> {
        found(self.repo.delete_content_block(key)?, "Content block")
    }
}

fn found(deleted: bool, what: &'static str) -> Result<(), DomainError> {
    if deleted {
        Ok(())
    } else {
        Err(DomainError::NotFound(what))
    }
}
