//! Session-held shopper state.
//!
//! The storefront owns no database. Everything it remembers between
//! requests lives in the signed session: the API token, the user profile,
//! badge counts, recent searches, the applied coupon and the order awaiting
//! a gateway callback.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::api::SessionToken;
use crate::api::types::User;
use crate::checkout::{AppliedCoupon, PendingPayment};

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Session keys.
pub mod keys {
    /// Bearer token issued by `/auth/login`.
    pub const TOKEN: &str = "token";

    /// Profile returned with the token.
    pub const USER: &str = "user";

    /// Cached cart and wishlist badge counts.
    pub const BADGES: &str = "badges";

    pub const RECENT_SEARCHES: &str = "recent_searches";

    /// Coupon accepted by `/coupon/apply`.
    pub const COUPON: &str = "applied_coupon";

    /// Toast messages shown on the next rendered page.
    pub const FLASH: &str = "flash";

    /// Order awaiting the gateway callback.
    pub const PENDING_PAYMENT: &str = "pending_payment";
}

// =============================================================================
// Authentication
// =============================================================================

/// Store the token and profile after a successful login.
///
/// The session id is cycled so a pre-login cookie cannot be replayed.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn log_in(session: &Session, token: &str, user: &User) -> SessionResult<()> {
    session.cycle_id().await?;
    session.insert(keys::TOKEN, token).await?;
    session.insert(keys::USER, user).await?;
    Ok(())
}

/// Drop everything tied to the logged-in shopper.
///
/// Flash messages survive so the logout toast can still be shown.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn log_out(session: &Session) -> SessionResult<()> {
    session.remove_value(keys::TOKEN).await?;
    session.remove_value(keys::USER).await?;
    session.remove_value(keys::BADGES).await?;
    session.remove_value(keys::COUPON).await?;
    session.remove_value(keys::PENDING_PAYMENT).await?;
    Ok(())
}

/// The stored token, if it is JWT-shaped. Anything else reads as logged out.
pub async fn token(session: &Session) -> Option<SessionToken> {
    session
        .get::<String>(keys::TOKEN)
        .await
        .ok()
        .flatten()
        .and_then(|raw| SessionToken::parse(&raw))
}

/// The stored profile, only when a valid token is also present.
pub async fn current_user(session: &Session) -> Option<User> {
    token(session).await?;
    session.get::<User>(keys::USER).await.ok().flatten()
}

// =============================================================================
// Badges
// =============================================================================

/// Cart and wishlist counts shown in the header.
///
/// These are cached so a page renders them straight away. The HTMX count
/// fragments refresh them from the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badges {
    pub cart: usize,
    pub wishlist: usize,
}

impl Badges {
    pub async fn load(session: &Session) -> Self {
        session
            .get::<Self>(keys::BADGES)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn set_cart(session: &Session, count: usize) -> SessionResult<()> {
        let mut badges = Self::load(session).await;
        badges.cart = count;
        session.insert(keys::BADGES, badges).await
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn set_wishlist(session: &Session, count: usize) -> SessionResult<()> {
        let mut badges = Self::load(session).await;
        badges.wishlist = count;
        session.insert(keys::BADGES, badges).await
    }
}

// =============================================================================
// Recent searches
// =============================================================================

/// Most recent first, de-duplicated, capped at [`RecentSearches::LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    pub const LIMIT: usize = 5;

    /// Move `term` to the front. Blank terms are ignored.
    pub fn record(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }
        self.0.retain(|t| t != term);
        self.0.insert(0, term.to_owned());
        self.0.truncate(Self::LIMIT);
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub async fn load(session: &Session) -> Self {
        session
            .get::<Self>(keys::RECENT_SEARCHES)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn remember(session: &Session, term: &str) -> SessionResult<()> {
        let mut recent = Self::load(session).await;
        recent.record(term);
        session.insert(keys::RECENT_SEARCHES, recent).await
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn clear(session: &Session) -> SessionResult<()> {
        session.remove_value(keys::RECENT_SEARCHES).await?;
        Ok(())
    }
}

// =============================================================================
// Checkout state
// =============================================================================

pub async fn applied_coupon(session: &Session) -> Option<AppliedCoupon> {
    session.get(keys::COUPON).await.ok().flatten()
}

/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_coupon(session: &Session, coupon: &AppliedCoupon) -> SessionResult<()> {
    session.insert(keys::COUPON, coupon).await
}

/// Remove the applied coupon. Returns whether there was one.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn drop_coupon(session: &Session) -> SessionResult<bool> {
    Ok(session
        .remove::<AppliedCoupon>(keys::COUPON)
        .await?
        .is_some())
}

/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_pending_payment(session: &Session, pending: &PendingPayment) -> SessionResult<()> {
    session.insert(keys::PENDING_PAYMENT, pending).await
}

pub async fn pending_payment(session: &Session) -> Option<PendingPayment> {
    session.get(keys::PENDING_PAYMENT).await.ok().flatten()
}

/// Take the pending payment, leaving none behind.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_pending_payment(session: &Session) -> SessionResult<Option<PendingPayment>> {
    session.remove(keys::PENDING_PAYMENT).await
}
