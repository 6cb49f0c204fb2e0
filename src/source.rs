use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Profile, Repository};

/// Where profiles and repository pages come from.
///
/// Implementations return `TrackerError::NotFound` for a missing user so the
/// session can tell it apart from every other failure.
#[async_trait]
pub trait UserSource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn get_user(&self, username: &str) -> Result<Profile>;

    /// One page of the user's public repositories, most starred first.
    async fn list_repos(&self, username: &str, page: u32, per_page: u32)
        -> Result<Vec<Repository>>;
}
