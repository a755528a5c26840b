//! One-time success notice bookkeeping
//!
//! Once a user's age is verified, the success notice is shown on the next
//! status check and never again for that user. The flag lives in a small
//! keyed store owned by the caller of the resolver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, PortError, UserId};

/// Storage key of a user's notice flag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoticeKey(String);

impl NoticeKey {
    const SUFFIX: &'static str = "_isAgeVerifiedSuccessMsgShown";

    /// Key for the age-verification success notice of `user`
    pub fn for_user(user: &UserId) -> Self {
        Self(format!("{}{}", user.as_str(), Self::SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoticeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persistent per-user notice flags
///
/// Flags never expire. Reads and writes are not atomic with respect to each
/// other; two concurrent status checks for the same user may both show the
/// notice.
#[async_trait]
pub trait SuccessNoticeStore: DomainPort {
    /// Returns true when the notice has already been shown
    async fn is_shown(&self, key: &NoticeKey) -> Result<bool, PortError>;

    /// Records the notice as shown
    async fn mark_shown(&self, key: &NoticeKey) -> Result<(), PortError>;
}

/// Process-local notice store
#[derive(Debug, Default)]
pub struct InMemoryNoticeStore {
    shown: RwLock<HashMap<NoticeKey, DateTime<Utc>>>,
}

impl InMemoryNoticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When the notice was recorded for `key`
    pub async fn shown_at(&self, key: &NoticeKey) -> Option<DateTime<Utc>> {
        self.shown.read().await.get(key).copied()
    }
}

impl DomainPort for InMemoryNoticeStore {}

#[async_trait]
impl SuccessNoticeStore for InMemoryNoticeStore {
    async fn is_shown(&self, key: &NoticeKey) -> Result<bool, PortError> {
        Ok(self.shown.read().await.contains_key(key))
    }

    async fn mark_shown(&self, key: &NoticeKey) -> Result<(), PortError> {
        self.shown.write().await.entry(key.clone()).or_insert_with(Utc::now);
        Ok(())
    }
}
