//! Wire types exchanged with the wallet server.

use std::collections::HashMap;
use std::fmt::{self, Display};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Server-side identifier of a stored API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(pub u64);

impl Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side identifier of a category. `0` stands for "Uncategorized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl CategoryId {
    pub const UNCATEGORIZED: Self = Self(0);

    pub const fn is_uncategorized(self) -> bool {
        self.0 == 0
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Key metadata as listed by the server. The secret itself is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiKey {
    pub id: KeyId,
    pub key_name: String,
    pub category_id: Option<CategoryId>,
    pub date_added: NaiveDateTime,
}

/// Response of `GET /get_categories_and_keys`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WalletListing {
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Keys keyed by category name, plus an "Uncategorized" bucket.
    #[serde(default)]
    pub grouped_keys: HashMap<String, Vec<ApiKey>>,
}

/// Response of `/get_key` and `/copy_key`.
///
/// Error bodies (`{"error": "..."}`) deserialize to `key: None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyResponse {
    #[serde(default)]
    pub key: Option<String>,
}

/// Response of the mutating endpoints.
///
/// Error bodies without a `success` field count as a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
}

/// Response of `POST /add_key`. `key` describes the stored key on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddKeyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub key: Option<AddedKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddedKey {
    pub id: KeyId,
    pub key_name: String,
    pub category_id: Option<CategoryId>,
    pub category_name: String,
}

/// The `{}` body sent to endpoints that take no parameters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EmptyBody {}

#[derive(Debug, Clone, Serialize)]
pub struct EditKeyRequest<'a> {
    pub key_name: &'a str,
}

/// `category` is `0` for "Uncategorized".
#[derive(Debug, Clone, Serialize)]
pub struct AddKeyRequest<'a> {
    pub key_name: &'a str,
    pub api_key: &'a str,
    pub category: CategoryId,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdateCategoryRequest {
    pub category_id: CategoryId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_bodies_match_the_server_contract() {
        assert_eq!(serde_json::to_string(&EmptyBody {}).unwrap(), "{}");
        assert_eq!(
            serde_json::to_string(&EditKeyRequest { key_name: "Stripe" }).unwrap(),
            r#"{"key_name":"Stripe"}"#
        );
        assert_eq!(
            serde_json::to_string(&UpdateCategoryRequest {
                category_id: CategoryId(3)
            })
            .unwrap(),
            r#"{"category_id":3}"#
        );
        assert_eq!(
            serde_json::to_string(&AddKeyRequest {
                key_name: "Stripe",
                api_key: "sk_live_abcd",
                category: CategoryId::UNCATEGORIZED,
            })
            .unwrap(),
            r#"{"key_name":"Stripe","api_key":"sk_live_abcd","category":0}"#
        );
    }

    #[test]
    fn add_key_response_describes_the_stored_key() {
        let added: AddKeyResponse = serde_json::from_str(
            r#"{
                "success": true,
                "message": "API Key added successfully.",
                "key": {"id": 12, "key_name": "Stripe", "category_id": null, "category_name": "Uncategorized"}
            }"#,
        )
        .unwrap();
        assert!(added.success);
        let key = added.key.unwrap();
        assert_eq!(key.id, KeyId(12));
        assert_eq!(key.category_id, None);
        assert_eq!(key.category_name, UNCATEGORIZED_NAME);

        let invalid: AddKeyResponse =
            serde_json::from_str(r#"{"success": false, "errors": {"api_key": ["This field is required."]}}"#)
                .unwrap();
        assert!(!invalid.success);
        assert_eq!(invalid.key, None);
    }

    #[test]
    fn error_bodies_read_as_no_op_responses() {
        let key: KeyResponse =
            serde_json::from_str(r#"{"error": "API Key not found or unauthorized."}"#).unwrap();
        assert_eq!(key.key, None);

        let saved: SuccessResponse =
            serde_json::from_str(r#"{"error": "An error occurred"}"#).unwrap();
        assert!(!saved.success);

        let rejected: SuccessResponse =
            serde_json::from_str(r#"{"success": false, "error": "New key name is required."}"#)
                .unwrap();
        assert!(!rejected.success);
    }

    #[test]
    fn listing_parses_server_timestamps() {
        let listing: WalletListing = serde_json::from_str(
            r#"{
                "categories": [{"id": 2, "name": "Payments"}],
                "grouped_keys": {
                    "Payments": [
                        {"id": 7, "key_name": "Stripe", "category_id": 2, "date_added": "2025-04-16T09:30:12.504321"}
                    ],
                    "Uncategorized": [
                        {"id": 9, "key_name": "OpenAI", "category_id": null, "date_added": "2025-04-17T18:00:00"}
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(listing.categories[0].id, CategoryId(2));
        let uncategorized = &listing.grouped_keys[UNCATEGORIZED_NAME];
        assert_eq!(uncategorized[0].id, KeyId(9));
        assert_eq!(uncategorized[0].category_id, None);
        assert_eq!(
            uncategorized[0].date_added.format("%Y-%m-%d").to_string(),
            "2025-04-17"
        );
    }
}
