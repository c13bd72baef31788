use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;
use crate::domain::newsletter::{
    normalize_email, SubscribeRequest, SubscribeResult, Subscriber, SubscriptionStatus,
};
use crate::domain::ports::{NewsletterRepository, Paging};

pub struct NewsletterService<N> {
    repo: N,
}

impl<N: NewsletterRepository> NewsletterService<N> {
    pub fn new(repo: N) -> Self {
        Self { repo }
    }

    /// New addresses are inserted; former subscribers come back with a
    /// fresh coupon; active subscribers are a conflict.
    pub fn subscribe(&self, request: SubscribeRequest, now: DateTime<Utc>) -> Result<SubscribeResult, DomainError> {
        let subscription = request.into_subscription(now)?;
        let subscriber = match self.repo.subscriber_by_email(&subscription.email)? {
            Some(existing) if existing.is_active => {
                return Err(DomainError::Conflict("Email is already subscribed".into()))
            }
            Some(former) => self.repo.reactivate_subscriber(former.id, &subscription)?,
            None => self.repo.insert_subscriber(&subscription)?,
        };
        log::info!("Newsletter subscription for subscriber {}", subscriber.id);
        Ok(SubscribeResult {
            discount_code: subscription.discount_code,
            expires_at: subscription.expires_at,
        })
    }

    pub fn status(&self, email: &str, now: DateTime<Utc>) -> Result<SubscriptionStatus, DomainError> {
        let email = normalize_email(email)?;
        let subscriber = self.repo.subscriber_by_email(&email)?;
        Ok(SubscriptionStatus::of(subscriber.as_ref(), now))
    }

    pub fn unsubscribe(&self, email: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        let email = normalize_email(email)?;
        if !self.repo.unsubscribe(&email, now)? {
            return Err(DomainError::NotFound("Subscriber"));
        }
        log::info!("Newsletter unsubscribe processed");
        Ok(())
    }

    pub fn subscribers(&self, paging: Paging) -> Result<(Vec<Subscriber>, i64), DomainError> {
        self.repo.subscribers(paging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::InMemoryStore;

    fn request(email: &str) -> SubscribeRequest {
        SubscribeRequest {
            email: email.into(),
            language: "sk".into(),
            gdpr_consent: true,
        }
    }

    #[test]
    fn subscribe_issues_a_coupon() {
        let service = NewsletterService::new(InMemoryStore::default());
        let now = Utc::now();
        let result = service.subscribe(request("Jana@Example.sk"), now).expect("subscribed");
        assert!(result.discount_code.starts_with("NEWS-"));
        assert_eq!(result.expires_at, now + chrono::Duration::hours(24));

        let status = service.status("jana@example.sk", now).expect("status");
        assert!(status.subscribed);
        assert_eq!(status.discount_code, Some(result.discount_code));
    }

    #[test]
    fn active_subscriber_conflicts() {
        let service = NewsletterService::new(InMemoryStore::default());
        service.subscribe(request("a@b.sk"), Utc::now()).expect("subscribed");
        assert!(matches!(
            service.subscribe(request(" A@B.sk "), Utc::now()),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn former_subscriber_is_reactivated_with_new_code() {
        let store = InMemoryStore::default();
        let service = NewsletterService::new(store.clone());
        let first = service.subscribe(request("a@b.sk"), Utc::now()).expect("subscribed");
        service.unsubscribe("a@b.sk", Utc::now()).expect("unsubscribed");
        assert!(!service.status("a@b.sk", Utc::now()).expect("status").subscribed);

        let second = service.subscribe(request("a@b.sk"), Utc::now()).expect("resubscribed");
        assert_ne!(first.discount_code, second.discount_code);
        let subscriber = store
            .subscriber_by_email("a@b.sk")
            .expect("query")
            .expect("exists");
        assert!(subscriber.is_active);
        assert!(!subscriber.discount_used);
        assert_eq!(service.subscribers(Paging::default()).expect("listed").1, 1);
    }

    #[test]
    fn unsubscribing_unknown_email_is_not_found() {
        let service = NewsletterService::new(InMemoryStore::default());
        assert!(matches!(
            service.unsubscribe("nobody@example.sk", Utc::now()),
            Err(DomainError::NotFound(_))
        ));
    }
}
