use chrono::{DateTime, Utc};

use crate::domain::dashboard::{CustomerSummary, Dashboard};
use crate::domain::errors::DomainError;
use crate::domain::ports::{DashboardRepository, Paging};

pub struct DashboardService<R> {
    repo: R,
}

impl<R: DashboardRepository> DashboardService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> Result<Dashboard, DomainError> {
        let data = self.repo.snapshot(now)?;
        Ok(Dashboard::compute(&data))
    }

    pub fn customers(
        &self,
        search: Option<&str>,
        paging: Paging,
    ) -> Result<(Vec<CustomerSummary>, i64), DomainError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo.customers(search, paging)
    }
}
