//! Authentication, saved addresses and customer inquiries.

use macstorm_core::AddressId;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::client::segment;
use super::de;
use super::types::{
    Ack, Address, AddressInput, Credentials, Inquiry, LoginResponse, PasswordReset, Registration,
};
use super::{ApiClient, ApiError, SessionToken};

#[derive(Deserialize)]
struct AddressesEnvelope {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    addresses: Vec<Address>,
}

impl ApiClient {
    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post_json("auth/login", credentials, None).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip(self, registration))]
    pub async fn register(&self, registration: &Registration) -> Result<Ack, ApiError> {
        self.post_json("auth/register", registration, None).await
    }

    /// Email a password reset link.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, email))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Ack, ApiError> {
        self.post_json("auth/request-reset-password", &json!({ "email": email }), None)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the reset token is invalid or the request fails.
    #[instrument(skip(self, reset))]
    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<Ack, ApiError> {
        self.post_json("auth/reset-password", reset, None).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn addresses(&self, token: Option<&SessionToken>) -> Result<Vec<Address>, ApiError> {
        let envelope: AddressesEnvelope = self.get("address", token).await?;
        Ok(envelope.addresses)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, address))]
    pub async fn create_address(
        &self,
        address: &AddressInput,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let _: Ack = self.post_json("address", address, token).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, address), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        id: &AddressId,
        address: &AddressInput,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .put_json(&format!("address/{}", segment(id.as_str())), address, token)
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(
        &self,
        id: &AddressId,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .delete(&format!("address/{}", segment(id.as_str())), token)
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn set_default_address(
        &self,
        id: &AddressId,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let _: Ack = self
            .put_json(
                &format!("address/set-default/{}", segment(id.as_str())),
                &json!({}),
                token,
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Inquiry
    // =========================================================================

    /// Send a contact-form message to customer support.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, inquiry), fields(inquiry_type = %inquiry.inquiry_type))]
    pub async fn submit_inquiry(&self, inquiry: &Inquiry) -> Result<(), ApiError> {
        let _: Ack = self.post_json("inquiry", inquiry, None).await?;
        Ok(())
    }
}
