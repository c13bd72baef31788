use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customer_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub is_verified_purchase: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReviewInput {
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
}

impl ReviewInput {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        if !(1..=5).contains(&self.rating) {
            return Err(DomainError::invalid("Rating must be between 1 and 5"));
        }
        self.content = self.content.trim().to_string();
        if self.content.is_empty() {
            return Err(DomainError::invalid("Review content is required"));
        }
        self.title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReviewStats {
    pub average: f64,
    pub count: i64,
    /// Buckets for ratings 5 down to 1.
    pub distribution: Vec<RatingBucket>,
}

impl ReviewStats {
    pub fn of(ratings: &[i32]) -> Self {
        let count = ratings.len() as i64;
        let average = if count == 0 {
            0.0
        } else {
            round1(ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / count as f64)
        };
        let distribution = (1..=5)
            .rev()
            .map(|rating| {
                let n = ratings.iter().filter(|&&r| r == rating).count() as i64;
                RatingBucket {
                    rating,
                    count: n,
                    percentage: percentage(n, count),
                }
            })
            .collect();
        ReviewStats {
            average,
            count,
            distribution,
        }
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whole-number share of `part` in `whole`; zero when `whole` is zero.
pub fn percentage(part: i64, whole: i64) -> i64 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as i64
    }
}
