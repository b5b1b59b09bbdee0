//! Contact form route handlers.
//!
//! Inquiries are forwarded to the commerce API's `/inquiry` endpoint.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use macstorm_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::api::types::Inquiry;
use crate::error::Result;
use crate::filters;
use crate::models::Flash;
use crate::state::AppState;

pub const INQUIRY_SENT: &str =
    "Thank you for your message! We'll get back to you within 24 hours.";
pub const INQUIRY_FAILED: &str = "Something went wrong. Please try again.";

const CONTACT_PATH: &str = "/contact-us";

/// Inquiry types offered in the form, as `(value, label)`.
pub const INQUIRY_TYPES: &[(&str, &str)] = &[
    ("general", "General Inquiry"),
    ("order", "Order Support"),
    ("shipping", "Shipping Question"),
    ("return", "Returns & Exchanges"),
    ("product", "Product Question"),
    ("wholesale", "Wholesale Inquiry"),
    ("other", "Other"),
];

const DEFAULT_TYPE: &str = "general";

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub inquiry_type: String,
}

impl ContactForm {
    fn blank() -> Self {
        Self {
            inquiry_type: DEFAULT_TYPE.to_string(),
            ..Self::default()
        }
    }

    /// Validate into the API body. Unknown inquiry types become `general`.
    ///
    /// # Errors
    ///
    /// Returns the message to show for the first problem found.
    pub fn validate(&self) -> std::result::Result<Inquiry, String> {
        if self.name.trim().is_empty()
            || self.subject.trim().is_empty()
            || self.message.trim().is_empty()
        {
            return Err("Please fill in all required fields".to_string());
        }
        let email = Email::parse(&self.email).map_err(|e| e.to_string())?;
        let inquiry_type = INQUIRY_TYPES
            .iter()
            .find(|(value, _)| *value == self.inquiry_type)
            .map_or(DEFAULT_TYPE, |(value, _)| *value);

        Ok(Inquiry {
            name: self.name.trim().to_owned(),
            email: email.to_string(),
            subject: self.subject.trim().to_owned(),
            message: self.message.trim().to_owned(),
            order_number: self.order_number.trim().to_owned(),
            inquiry_type: inquiry_type.to_owned(),
        })
    }
}

pub struct InquiryTypeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub form: ContactForm,
    pub types: Vec<InquiryTypeOption>,
    pub error: Option<String>,
}

impl ContactTemplate {
    fn new(layout: Layout, form: ContactForm, error: Option<String>) -> Self {
        let types = INQUIRY_TYPES
            .iter()
            .map(|&(value, label)| InquiryTypeOption {
                value,
                label,
                selected: value == form.inquiry_type,
            })
            .collect();
        Self {
            layout,
            form,
            types,
            error,
        }
    }
}

pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    ContactTemplate::new(
        Layout::load(&state, &session).await,
        ContactForm::blank(),
        None,
    )
}

/// Send an inquiry to support.
#[instrument(skip(state, session, form), fields(inquiry_type = %form.inquiry_type))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let outcome = match form.validate() {
        Ok(inquiry) => state.api().submit_inquiry(&inquiry).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to submit inquiry");
            INQUIRY_FAILED.to_string()
        }),
        Err(message) => Err(message),
    };

    match outcome {
        Ok(()) => {
            Flash::success(&session, INQUIRY_SENT).await?;
            Ok(Redirect::to(CONTACT_PATH).into_response())
        }
        Err(message) => {
            let layout = Layout::load(&state, &session).await;
            let page = ContactTemplate::new(layout, form, Some(message));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}
