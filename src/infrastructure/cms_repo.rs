use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cms::{Banner, BannerInput, ContentBlock, ContentBlockInput, HomepageSection, SectionInput};
use crate::domain::errors::DomainError;
use crate::domain::ports::CmsRepository;
use crate::schema::{banners, content_blocks, homepage_sections};

use super::conflict_as;
use super::models::{BannerRow, BannerValues, ContentBlockRow, NewContentBlockRow, SectionRow, SectionValues};

const DUPLICATE_SECTION: &str = "Section key already exists";

/// Homepage sections, banners and keyed content blocks.
pub struct DieselCmsRepository {
    pool: DbPool,
}

impl DieselCmsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CmsRepository for DieselCmsRepository {
    fn sections(&self) -> Result<Vec<HomepageSection>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = homepage_sections::table
            .select(SectionRow::as_select())
            .order((homepage_sections::sort_order.asc(), homepage_sections::section_key.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(HomepageSection::from).collect())
    }

    fn create_section(&self, input: SectionInput) -> Result<HomepageSection, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(homepage_sections::table)
            .values((homepage_sections::id.eq(Uuid::new_v4()), &SectionValues::new(input, Utc::now())))
            .returning(SectionRow::as_returning())
            .get_result(&mut conn)
            .map_err(conflict_as(DUPLICATE_SECTION))?;
        Ok(row.into())
    }

    fn update_section(&self, id: Uuid, input: SectionInput) -> Result<Option<HomepageSection>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(homepage_sections::table.find(id))
            .set(&SectionValues::new(input, Utc::now()))
            .returning(SectionRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(conflict_as(DUPLICATE_SECTION))?;
        Ok(row.map(HomepageSection::from))
    }

    fn delete_section(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(homepage_sections::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn banners(&self, placement: Option<&str>) -> Result<Vec<Banner>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = banners::table.select(BannerRow::as_select()).into_boxed::<Pg>();
        if let Some(placement) = placement {
            query = query.filter(banners::placement.eq(placement.to_string()));
        }
        let rows = query
            .order((banners::sort_order.asc(), banners::name.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    fn create_banner(&self, input: BannerInput) -> Result<Banner, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(banners::table)
            .values((banners::id.eq(Uuid::new_v4()), &BannerValues::from(input)))
            .returning(BannerRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update_banner(&self, id: Uuid, input: BannerInput) -> Result<Option<Banner>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(banners::table.find(id))
            .set(&BannerValues::from(input))
            .returning(BannerRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Banner::from))
    }

    fn delete_banner(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(banners::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn content_blocks(&self) -> Result<Vec<ContentBlock>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = content_blocks::table
            .select(ContentBlockRow::as_select())
            .order(content_blocks::block_key.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(ContentBlock::from).collect())
    }

    fn upsert_content_block(&self, key: &str, input: ContentBlockInput) -> Result<ContentBlock, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(content_blocks::table)
            .values(&NewContentBlockRow {
                id: Uuid::new_v4(),
                block_key: key.to_string(),
                block_type: input.block_type,
                title_sk: input.title_sk,
                content: input.content,
                is_active: input.is_active,
                updated_at: Utc::now(),
            })
            .on_conflict(content_blocks::block_key)
            .do_update()
            .set((
                content_blocks::block_type.eq(excluded(content_blocks::block_type)),
                content_blocks::title_sk.eq(excluded(content_blocks::title_sk)),
                content_blocks::content.eq(excluded(content_blocks::content)),
                content_blocks::is_active.eq(excluded(content_blocks::is_active)),
                content_blocks::updated_at.eq(excluded(content_blocks::updated_at)),
            ))
            .returning(ContentBlockRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn delete_content_block(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(content_blocks::table.filter(content_blocks::block_key.eq(key)))
            .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
