use crate::affiliate::client::{AffiliateService, ApiError};
use crate::affiliate::models::SavedAffiliate;
use crate::bulk::{BatchAction, ItemOutcome};

/// Bulk operations offered on the saved-affiliates page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Delete,
    FindEmail,
    GenerateOutreach,
}

impl BatchKind {
    /// True when the item needs no work for this kind, so the caller skips it.
    pub fn precondition_met(&self, affiliate: &SavedAffiliate) -> bool {
        match self {
            BatchKind::Delete => false,
            BatchKind::FindEmail => affiliate.has_email(),
            BatchKind::GenerateOutreach => affiliate.has_message(),
        }
    }

    /// Whether a successful run changes item data that should be reloaded.
    pub fn refreshes_items(&self) -> bool {
        !matches!(self, BatchKind::Delete)
    }

    pub async fn perform(
        &self,
        service: &dyn AffiliateService,
        affiliate: &SavedAffiliate,
    ) -> Result<ItemOutcome, ApiError> {
        match self {
            BatchKind::Delete => {
                service.delete(affiliate.id).await?;
                Ok(ItemOutcome::Success)
            }
            BatchKind::FindEmail => match service.find_email(affiliate).await? {
                Some(_) => Ok(ItemOutcome::Success),
                None => Ok(ItemOutcome::Failure("no email found".to_string())),
            },
            BatchKind::GenerateOutreach => {
                service.generate_outreach(affiliate).await?;
                Ok(ItemOutcome::Success)
            }
        }
    }
}

impl BatchAction for BatchKind {
    fn in_progress_label(&self) -> &'static str {
        match self {
            BatchKind::Delete => "Deleting",
            BatchKind::FindEmail => "Finding emails",
            BatchKind::GenerateOutreach => "Generating",
        }
    }

    fn done_label(&self) -> &'static str {
        match self {
            BatchKind::Delete => "Deleted",
            BatchKind::FindEmail => "Found emails for",
            BatchKind::GenerateOutreach => "Generated",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            BatchKind::GenerateOutreach => "messages",
            _ => "affiliates",
        }
    }

    fn removes_items(&self) -> bool {
        matches!(self, BatchKind::Delete)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory service; ids in `failing` reject every call.
    #[derive(Default)]
    pub struct FakeService {
        pub affiliates: Mutex<Vec<SavedAffiliate>>,
        pub failing: HashSet<u64>,
        pub unavailable: bool,
        pub calls: Mutex<Vec<(&'static str, u64)>>,
    }

    impl FakeService {
        pub fn with(affiliates: Vec<SavedAffiliate>) -> Self {
            Self {
                affiliates: Mutex::new(affiliates),
                ..Self::default()
            }
        }

        fn record(&self, call: &'static str, id: u64) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push((call, id));
            if self.failing.contains(&id) {
                return Err(ApiError::Rejected("Insufficient credits".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AffiliateService for FakeService {
        async fn list_saved(&self) -> Result<Vec<SavedAffiliate>, ApiError> {
            if self.unavailable {
                return Err(ApiError::RequestFailed("connection refused".to_string()));
            }
            Ok(self.affiliates.lock().unwrap().clone())
        }

        async fn delete(&self, id: u64) -> Result<(), ApiError> {
            self.record("delete", id)?;
            self.affiliates.lock().unwrap().retain(|affiliate| affiliate.id != id);
            Ok(())
        }

        async fn find_email(&self, affiliate: &SavedAffiliate) -> Result<Option<String>, ApiError> {
            self.record("find_email", affiliate.id)?;
            if affiliate.domain.ends_with(".invalid") {
                return Ok(None);
            }
            let email = format!("partners@{}", affiliate.domain);
            let mut affiliates = self.affiliates.lock().unwrap();
            if let Some(stored) = affiliates.iter_mut().find(|stored| stored.id == affiliate.id) {
                stored.email = Some(email.clone());
            }
            Ok(Some(email))
        }

        async fn generate_outreach(&self, affiliate: &SavedAffiliate) -> Result<String, ApiError> {
            self.record("generate_outreach", affiliate.id)?;
            Ok(format!("Hello {}", affiliate.domain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeService;
    use super::*;
    use crate::affiliate::models::affiliate;

    #[test]
    fn test_preconditions() {
        let with_email = affiliate(1, "a.com", Some("x@a.com"));
        let without = affiliate(2, "b.com", None);

        assert!(BatchKind::FindEmail.precondition_met(&with_email));
        assert!(!BatchKind::FindEmail.precondition_met(&without));
        assert!(!BatchKind::Delete.precondition_met(&with_email));

        let mut drafted = without.clone();
        drafted.outreach_message = Some("Hi".to_string());
        assert!(BatchKind::GenerateOutreach.precondition_met(&drafted));
        assert!(!BatchKind::GenerateOutreach.precondition_met(&without));
    }

    #[tokio::test]
    async fn test_email_lookup_without_result_is_a_failure() {
        let service = FakeService::default();
        let target = affiliate(4, "nobody.invalid", None);

        let outcome = BatchKind::FindEmail.perform(&service, &target).await.unwrap();

        assert_eq!(outcome, ItemOutcome::Failure("no email found".to_string()));
    }

    #[tokio::test]
    async fn test_rejection_propagates_as_error() {
        let mut service = FakeService::default();
        service.failing.insert(9);
        let target = affiliate(9, "shop.io", Some("a@shop.io"));

        let error = BatchKind::GenerateOutreach
            .perform(&service, &target)
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Insufficient credits");
    }

    #[tokio::test]
    async fn test_delete_calls_service() {
        let service = FakeService::with(vec![affiliate(1, "a.com", None)]);
        let target = affiliate(1, "a.com", None);

        let outcome = BatchKind::Delete.perform(&service, &target).await.unwrap();

        assert!(outcome.is_success());
        assert!(service.affiliates.lock().unwrap().is_empty());
        assert_eq!(*service.calls.lock().unwrap(), vec![("delete", 1)]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(BatchKind::GenerateOutreach.in_progress_label(), "Generating");
        assert_eq!(BatchKind::GenerateOutreach.noun(), "messages");
        assert!(BatchKind::Delete.removes_items());
        assert!(!BatchKind::FindEmail.removes_items());
        assert!(BatchKind::FindEmail.refreshes_items());
    }
}
