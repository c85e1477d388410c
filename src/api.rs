//! Access to the wallet server.
//!
//! [`WalletApi`] is the seam between the wallet screen and the network. The
//! screen only ever talks to this trait; [`HttpWalletClient`] implements it
//! against the real server.

mod client;
mod model;

use async_trait::async_trait;

pub use client::{ApiError, HttpWalletClient};
pub use model::{
    AddKeyResponse, AddedKey, ApiKey, Category, CategoryId, KeyId, KeyResponse, SuccessResponse,
    UNCATEGORIZED_NAME, WalletListing,
};

/// Endpoints of the wallet server used by the client.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// `GET /get_categories_and_keys`
    async fn list_keys(&self) -> Result<WalletListing, ApiError>;

    /// `POST /add_key` with body `{key_name, api_key, category}`
    async fn add_key(
        &self,
        key_name: &str,
        api_key: &str,
        category: CategoryId,
    ) -> Result<AddKeyResponse, ApiError>;

    /// `POST /get_key/{id}` with body `{}`
    async fn get_key(&self, id: KeyId) -> Result<KeyResponse, ApiError>;

    /// `POST /copy_key/{id}` with body `{}`
    async fn copy_key(&self, id: KeyId) -> Result<KeyResponse, ApiError>;

    /// `POST /edit_key/{id}` with body `{key_name}`
    async fn edit_key(&self, id: KeyId, key_name: &str) -> Result<SuccessResponse, ApiError>;

    /// `POST /delete_key/{id}` with body `{}`
    async fn delete_key(&self, id: KeyId) -> Result<SuccessResponse, ApiError>;

    /// `POST /update_key_category/{id}` with body `{category_id}`
    async fn update_key_category(
        &self,
        id: KeyId,
        category_id: CategoryId,
    ) -> Result<SuccessResponse, ApiError>;
}
