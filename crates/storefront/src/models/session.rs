//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use sokoni_backend::Identity;
use sokoni_core::{BuyerId, Email, SellerId};

/// Session-stored user identity.
///
/// One account can both buy and sell; the account id keys the buyer's
/// cart document and the seller's profile/catalog documents alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend account id.
    pub id: String,
    /// The account's email address.
    pub email: Email,
}

impl CurrentUser {
    /// The account id as a cart document key.
    #[must_use]
    pub fn buyer_id(&self) -> BuyerId {
        BuyerId::new(self.id.clone())
    }

    /// The account id as a profile/catalog document key.
    #[must_use]
    pub fn seller_id(&self) -> SellerId {
        SellerId::new(self.id.clone())
    }
}

impl From<Identity> for CurrentUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
