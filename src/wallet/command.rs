//! Commands for wallet operations.
//!
//! Each command performs one request and reports back through the wallet's
//! message channel. Request failures are logged and otherwise dropped; a
//! response without a key or without `success` is a silent no-op.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use crate::api::{CategoryId, KeyId, WalletApi};
use crate::command::{ClipboardSink, Command};
use crate::wallet::WalletMsg;

/// Fetch the listing the page is built from.
pub struct FetchWalletCmd {
    pub api: Arc<dyn WalletApi>,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for FetchWalletCmd {
    fn name(&self) -> String {
        "Loading wallet".to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let msg = match self.api.list_keys().await {
            Ok(listing) => WalletMsg::Loaded(listing),
            Err(err) => {
                error!(error = %err, "Failed to load wallet");
                WalletMsg::LoadFailed(err.to_string())
            }
        };
        self.tx.send(msg)?;
        Ok(())
    }
}

/// Store a new key; reloads the wallet on success.
pub struct AddKeyCmd {
    pub api: Arc<dyn WalletApi>,
    pub key_name: String,
    pub api_key: String,
    pub category: CategoryId,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for AddKeyCmd {
    fn name(&self) -> String {
        format!("Adding key {}", self.key_name)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        match self
            .api
            .add_key(&self.key_name, &self.api_key, self.category)
            .await
        {
            Ok(response) if response.success => {
                if let Some(key) = &response.key {
                    debug!(
                        id = %key.id,
                        name = %key.key_name,
                        category_id = ?key.category_id,
                        category = %key.category_name,
                        "Key added"
                    );
                }
                self.tx.send(WalletMsg::Load)?;
            }
            Ok(_) => debug!(name = %self.key_name, "Key not added"),
            Err(err) => error!(name = %self.key_name, error = %err, "Failed to add key"),
        }
        Ok(())
    }
}

/// Fetch the secret of a key for display.
pub struct RevealKeyCmd {
    pub api: Arc<dyn WalletApi>,
    pub id: KeyId,
    pub generation: u64,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for RevealKeyCmd {
    fn name(&self) -> String {
        format!("Revealing key {}", self.id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        match self.api.get_key(self.id).await {
            Ok(response) => match response.key {
                Some(secret) => self.tx.send(WalletMsg::KeyRevealed {
                    id: self.id,
                    secret,
                    generation: self.generation,
                })?,
                None => debug!(id = %self.id, "No key in response"),
            },
            Err(err) => error!(id = %self.id, error = %err, "Failed to reveal key"),
        }
        Ok(())
    }
}

/// Fetch the secret of a key and put it on the clipboard.
pub struct CopyKeyCmd {
    pub api: Arc<dyn WalletApi>,
    pub clipboard: Arc<dyn ClipboardSink>,
    pub id: KeyId,
    pub generation: u64,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for CopyKeyCmd {
    fn name(&self) -> String {
        format!("Copying key {}", self.id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let secret = match self.api.copy_key(self.id).await {
            Ok(response) => response.key,
            Err(err) => {
                error!(id = %self.id, error = %err, "Failed to copy key");
                return Ok(());
            }
        };
        let Some(secret) = secret else {
            debug!(id = %self.id, "No key in response");
            return Ok(());
        };

        match self.clipboard.set_text(secret) {
            Ok(()) => self.tx.send(WalletMsg::KeyCopied {
                id: self.id,
                generation: self.generation,
            })?,
            Err(err) => error!(id = %self.id, error = %err, "Failed to write clipboard"),
        }
        Ok(())
    }
}

/// Restore the copy icon once the feedback window has passed.
pub struct CopyFlashCmd {
    pub id: KeyId,
    pub generation: u64,
    pub duration: Duration,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for CopyFlashCmd {
    fn name(&self) -> String {
        format!("Copy feedback for key {}", self.id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        tokio::time::sleep(self.duration).await;
        // The wallet may have been closed in the meantime
        let _ = self.tx.send(WalletMsg::CopyFlashExpired {
            id: self.id,
            generation: self.generation,
        });
        Ok(())
    }
}

/// Rename a key; reloads the wallet on success.
pub struct EditKeyCmd {
    pub api: Arc<dyn WalletApi>,
    pub id: KeyId,
    pub key_name: String,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for EditKeyCmd {
    fn name(&self) -> String {
        format!("Renaming key {} to {}", self.id, self.key_name)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        match self.api.edit_key(self.id, &self.key_name).await {
            Ok(response) if response.success => self.tx.send(WalletMsg::Load)?,
            Ok(_) => debug!(id = %self.id, "Rename not applied"),
            Err(err) => error!(id = %self.id, error = %err, "Failed to rename key"),
        }
        Ok(())
    }
}

/// Delete a key; reports back on success.
pub struct DeleteKeyCmd {
    pub api: Arc<dyn WalletApi>,
    pub id: KeyId,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for DeleteKeyCmd {
    fn name(&self) -> String {
        format!("Deleting key {}", self.id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        match self.api.delete_key(self.id).await {
            Ok(response) if response.success => self.tx.send(WalletMsg::Deleted)?,
            Ok(_) => debug!(id = %self.id, "Delete not applied"),
            Err(err) => error!(id = %self.id, error = %err, "Failed to delete key"),
        }
        Ok(())
    }
}

/// Move a key to another category; reloads the wallet on success.
pub struct UpdateCategoryCmd {
    pub api: Arc<dyn WalletApi>,
    pub id: KeyId,
    pub category_id: CategoryId,
    pub tx: UnboundedSender<WalletMsg>,
}

#[async_trait]
impl Command for UpdateCategoryCmd {
    fn name(&self) -> String {
        format!("Moving key {} to category {}", self.id, self.category_id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        match self
            .api
            .update_key_category(self.id, self.category_id)
            .await
        {
            Ok(response) if response.success => self.tx.send(WalletMsg::Load)?,
            Ok(_) => debug!(id = %self.id, "Category change not applied"),
            Err(err) => error!(id = %self.id, error = %err, "Failed to change category"),
        }
        Ok(())
    }
}
