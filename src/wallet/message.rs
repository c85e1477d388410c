//! Messages for the wallet screen.
//!
//! User interactions and async results both flow through this single
//! message type into `Wallet::update()`. Results of requests made against a
//! page carry that page's generation; a reload starts a new one.

use crate::api::{CategoryId, KeyId, WalletListing};

#[derive(Debug, Clone)]
pub enum WalletMsg {
    // === Page load ===
    /// Fetch the listing and rebuild the page
    Load,
    /// Listing fetched
    Loaded(WalletListing),
    /// Listing could not be fetched
    LoadFailed(String),
    /// Reload with the previous/next category filter
    StepFilter { forward: bool },

    // === Visibility ===
    /// Show or hide the secret of a key
    ToggleVisibility(KeyId),
    /// Server returned the secret for a key
    KeyRevealed {
        id: KeyId,
        secret: String,
        generation: u64,
    },

    // === Copy ===
    /// Copy the secret of a key to the clipboard
    Copy(KeyId),
    /// Secret written to the clipboard
    KeyCopied { id: KeyId, generation: u64 },
    /// Copy feedback window elapsed
    CopyFlashExpired { id: KeyId, generation: u64 },

    // === Add ===
    /// Open the add form
    OpenAdd,
    /// Add form completed
    SubmitAdd {
        key_name: String,
        api_key: String,
        category: CategoryId,
    },
    /// Add form dismissed
    CancelAdd,

    // === Edit ===
    /// Open the edit dialog for a key
    OpenEdit(KeyId),
    /// Edit form submitted with the name field's value
    SubmitEdit { id: KeyId, key_name: String },
    /// Edit dialog dismissed
    CancelEdit,

    // === Delete ===
    /// Ask for confirmation before deleting a key
    OpenDelete(KeyId),
    /// Delete the pending key
    ConfirmDelete,
    /// Delete dialog dismissed
    CancelDelete,
    /// Server confirmed the deletion
    Deleted,

    // === Category ===
    /// Open the category selector for a key
    OpenCategorySelect(KeyId),
    /// Category selector value chosen
    ChangeCategory { id: KeyId, category_id: CategoryId },
    /// Category selector dismissed
    CancelCategorySelect,

    // === Modals ===
    /// Click landed outside the open modal
    BackdropClicked,
}
