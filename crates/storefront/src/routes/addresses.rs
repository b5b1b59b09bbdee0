//! Saved address management.
//!
//! One page lists the shopper's addresses next to a form for adding a new
//! one or editing an existing one. The state select swaps in matching city
//! options over HTMX.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use macstorm_core::AddressId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::addresses::{
    ADDRESS_DELETED, ADDRESS_SAVE_FAILED, ADDRESS_SAVED, ADDRESS_UPDATED, AddressErrors,
    AddressForm, DEFAULT_UPDATED, cities, default_address, states,
};
use crate::api::types::Address;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, Shopper};
use crate::models::Flash;
use crate::state::AppState;

pub const ADDRESSES_PATH: &str = "/address-management";

const DELETE_FAILED: &str = "Failed to delete address";
const DEFAULT_FAILED: &str = "Failed to update default address";

fn address_path(id: &str) -> String {
    format!("{ADDRESSES_PATH}/{}", urlencoding::encode(id))
}

/// A saved address card.
pub struct AddressView {
    pub id: String,
    /// Base path for this address's actions.
    pub path: String,
    pub full_name: String,
    pub lines: Vec<String>,
    pub mobile: String,
    pub is_default: bool,
}

impl AddressView {
    fn new(address: &Address, default_id: Option<&AddressId>) -> Self {
        Self {
            id: address.id.to_string(),
            path: address_path(address.id.as_str()),
            full_name: address.full_name.clone(),
            lines: [
                address.house_number.as_str(),
                address.street.as_str(),
                address.landmark.as_str(),
            ]
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_owned)
            .chain([address.locality(), address.country.clone()])
            .filter(|l| !l.trim().is_empty())
            .collect(),
            mobile: address.mobile_number.clone(),
            is_default: default_id == Some(&address.id),
        }
    }
}

/// Cards for every address, the effective default marked.
#[must_use]
pub fn address_views(addresses: &[Address]) -> Vec<AddressView> {
    let default_id = default_address(addresses).map(|a| &a.id);
    addresses
        .iter()
        .map(|a| AddressView::new(a, default_id))
        .collect()
}

/// One `<option>` in a state or city select.
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

fn select_options(
    values: impl IntoIterator<Item = &'static str>,
    current: &str,
) -> Vec<SelectOption> {
    values
        .into_iter()
        .map(|value| SelectOption {
            value,
            selected: value == current,
        })
        .collect()
}

/// Address management page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub layout: Layout,
    /// `None` when the list failed to load.
    pub addresses: Option<Vec<AddressView>>,
    pub form: AddressForm,
    /// Where the form posts: the list for a new address, the address for
    /// an edit.
    pub action: String,
    pub editing: bool,
    pub errors: AddressErrors,
    /// Backend failure shown above the form.
    pub form_error: Option<String>,
    pub states: Vec<SelectOption>,
    pub options: Vec<SelectOption>,
}

impl AddressesTemplate {
    async fn load(
        state: &AppState,
        session: &Session,
        shopper: &Shopper,
        form: AddressForm,
        editing: Option<&AddressId>,
    ) -> (Self, Option<Vec<Address>>) {
        let (layout, addresses) = tokio::join!(
            Layout::load(state, session),
            state.api().addresses(Some(&shopper.token))
        );
        let addresses = match addresses {
            Ok(addresses) => Some(addresses),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load addresses");
                None
            }
        };
        let mut page = Self {
            layout,
            addresses: addresses.as_deref().map(address_views),
            form,
            action: editing.map_or_else(
                || ADDRESSES_PATH.to_string(),
                |id| address_path(id.as_str()),
            ),
            editing: editing.is_some(),
            errors: AddressErrors::default(),
            form_error: None,
            states: Vec::new(),
            options: Vec::new(),
        };
        page.refresh_options();
        (page, addresses)
    }

    /// Rebuild both selects from the form's current state and city.
    fn refresh_options(&mut self) {
        self.states = select_options(states(), &self.form.state);
        self.options = select_options(self.form.city_options().iter().copied(), &self.form.city);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressesQuery {
    /// Address to prefill the form with.
    pub edit: Option<String>,
    /// State picked before the city list was reloaded without HTMX.
    pub state: Option<String>,
}

/// Display saved addresses and the address form.
#[instrument(skip(state, session, shopper))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Query(query): Query<AddressesQuery>,
) -> impl IntoResponse {
    let editing = query
        .edit
        .filter(|id| !id.trim().is_empty())
        .map(AddressId::new);
    let (mut page, addresses) =
        AddressesTemplate::load(&state, &session, &shopper, AddressForm::blank(), None).await;

    if let Some(id) = editing
        && let Some(address) = addresses.iter().flatten().find(|a| a.id == id)
    {
        page.form = AddressForm::from_address(address);
        page.action = address_path(id.as_str());
        page.editing = true;
    }
    if let Some(selected) = query.state.as_deref() {
        page.form.set_state(selected);
    }
    page.refresh_options();
    page
}

/// City `<option>`s for a state (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/city_options.html")]
pub struct CityOptionsTemplate {
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    #[serde(default)]
    pub state: String,
}

pub async fn city_options(Query(query): Query<CitiesQuery>) -> impl IntoResponse {
    CityOptionsTemplate {
        options: select_options(cities(&query.state).iter().copied(), ""),
    }
}

/// Re-render the page with the submitted form and what went wrong.
async fn form_failure(
    state: &AppState,
    session: &Session,
    shopper: &Shopper,
    form: AddressForm,
    editing: Option<&AddressId>,
    errors: AddressErrors,
    form_error: Option<String>,
) -> Response {
    let (mut page, _) = AddressesTemplate::load(state, session, shopper, form, editing).await;
    page.errors = errors;
    page.form_error = form_error;
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

/// Save a new address.
#[instrument(skip(state, session, shopper, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(form_failure(&state, &session, &shopper, form, None, errors, None).await);
        }
    };

    match state.api().create_address(&input, Some(&shopper.token)).await {
        Ok(()) => {
            Flash::success(&session, ADDRESS_SAVED).await?;
            Ok(Redirect::to(ADDRESSES_PATH).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create address");
            let message = e.user_message(ADDRESS_SAVE_FAILED);
            Ok(form_failure(
                &state,
                &session,
                &shopper,
                form,
                None,
                AddressErrors::default(),
                Some(message),
            )
            .await)
        }
    }
}

/// Save changes to an existing address.
#[instrument(skip(state, session, shopper, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Path(id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let id = AddressId::new(id);
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(
                form_failure(&state, &session, &shopper, form, Some(&id), errors, None).await,
            );
        }
    };

    match state
        .api()
        .update_address(&id, &input, Some(&shopper.token))
        .await
    {
        Ok(()) => {
            Flash::success(&session, ADDRESS_UPDATED).await?;
            Ok(Redirect::to(ADDRESSES_PATH).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, address_id = %id, "Failed to update address");
            let message = e.user_message(ADDRESS_SAVE_FAILED);
            Ok(form_failure(
                &state,
                &session,
                &shopper,
                form,
                Some(&id),
                AddressErrors::default(),
                Some(message),
            )
            .await)
        }
    }
}

#[instrument(skip(state, session, shopper))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = AddressId::new(id);
    match state.api().delete_address(&id, Some(&shopper.token)).await {
        Ok(()) => Flash::success(&session, ADDRESS_DELETED).await?,
        Err(e) => {
            tracing::error!(error = %e, address_id = %id, "Failed to delete address");
            Flash::error(&session, e.user_message(DELETE_FAILED)).await?;
        }
    }
    Ok(Redirect::to(ADDRESSES_PATH).into_response())
}

#[instrument(skip(state, session, shopper))]
pub async fn set_default(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = AddressId::new(id);
    match state
        .api()
        .set_default_address(&id, Some(&shopper.token))
        .await
    {
        Ok(()) => Flash::success(&session, DEFAULT_UPDATED).await?,
        Err(e) => {
            tracing::error!(error = %e, address_id = %id, "Failed to set default address");
            Flash::error(&session, e.user_message(DEFAULT_FAILED)).await?;
        }
    }
    Ok(Redirect::to(ADDRESSES_PATH).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(id: &str, is_default: bool) -> Address {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "fullName": "Asha Rao",
            "mobileNumber": 9_876_543_210_u64,
            "houseNumber": "12B",
            "street": "MG Road",
            "landmark": "",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001",
            "country": "India",
            "isDefault": is_default,
        }))
        .unwrap()
    }

    #[test]
    fn test_first_address_is_default_when_none_flagged() {
        let views = address_views(&[address("a1", false), address("a2", false)]);
        assert!(views[0].is_default);
        assert!(!views[1].is_default);
    }

    #[test]
    fn test_flagged_address_is_default() {
        let views = address_views(&[address("a1", false), address("a2", true)]);
        assert!(!views[0].is_default);
        assert!(views[1].is_default);
    }

    #[test]
    fn test_select_options_mark_current() {
        let options = select_options(cities("Delhi").iter().copied(), "New Delhi");
        assert_eq!(options.len(), 2);
        assert!(options[0].selected);
        assert!(!options[1].selected);
        assert!(select_options(cities("Atlantis").iter().copied(), "").is_empty());
    }

    #[test]
    fn test_address_view_skips_blank_lines() {
        let views = address_views(&[address("a 1", true)]);
        assert_eq!(views[0].path, "/address-management/a%201");
        assert_eq!(
            views[0].lines,
            vec!["12B", "MG Road", "Pune, Maharashtra - 411001", "India"]
        );
        assert_eq!(views[0].mobile, "9876543210");
    }
}
