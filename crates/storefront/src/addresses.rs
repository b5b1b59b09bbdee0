//! Address form handling and the supported delivery regions.

use macstorm_core::{ContactError, MobileNumber, Pincode};
use serde::Deserialize;

use crate::api::types::{Address, AddressInput};

pub const ADDRESS_SAVED: &str = "Address saved successfully!";
pub const ADDRESS_UPDATED: &str = "Address updated successfully!";
pub const ADDRESS_DELETED: &str = "Address deleted successfully!";
pub const DEFAULT_UPDATED: &str = "Default address updated successfully!";
pub const ADDRESS_SAVE_FAILED: &str = "Failed to save address. Please try again.";

pub const DEFAULT_COUNTRY: &str = "India";

/// States we deliver to, with their cities.
pub const CITIES_BY_STATE: &[(&str, &[&str])] = &[
    ("Maharashtra", &["Mumbai", "Pune", "Nagpur", "Thane", "Nashik"]),
    ("Delhi", &["New Delhi", "Delhi Cantonment"]),
    ("Karnataka", &["Bangalore", "Mysore", "Hubli", "Mangalore"]),
    ("Tamil Nadu", &["Chennai", "Coimbatore", "Madurai", "Salem"]),
    ("Gujarat", &["Ahmedabad", "Surat", "Vadodara", "Rajkot"]),
    ("Rajasthan", &["Jaipur", "Jodhpur", "Udaipur", "Kota"]),
    ("West Bengal", &["Kolkata", "Howrah", "Durgapur", "Siliguri"]),
    ("Uttar Pradesh", &["Lucknow", "Kanpur", "Varanasi", "Agra"]),
];

#[must_use]
pub fn states() -> impl Iterator<Item = &'static str> {
    CITIES_BY_STATE.iter().map(|(state, _)| *state)
}

/// Cities for `state`, empty when the state is not supported.
#[must_use]
pub fn cities(state: &str) -> &'static [&'static str] {
    match CITIES_BY_STATE.iter().find(|(s, _)| *s == state) {
        Some((_, cities)) => *cities,
        None => &[],
    }
}

/// The address used for checkout when the shopper has not picked one.
#[must_use]
pub fn default_address(addresses: &[Address]) -> Option<&Address> {
    addresses
        .iter()
        .find(|a| a.is_default)
        .or_else(|| addresses.first())
}

/// Per-field validation messages. `None` means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressErrors {
    pub full_name: Option<&'static str>,
    pub mobile_number: Option<&'static str>,
    pub house_number: Option<&'static str>,
    pub street: Option<&'static str>,
    pub city: Option<&'static str>,
    pub state: Option<&'static str>,
    pub pincode: Option<&'static str>,
}

impl AddressErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    /// Every message, in form order.
    #[must_use]
    pub fn messages(&self) -> Vec<&'static str> {
        [
            self.full_name,
            self.mobile_number,
            self.house_number,
            self.street,
            self.city,
            self.state,
            self.pincode,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

const fn contact_message(err: &ContactError) -> &'static str {
    match err {
        ContactError::MobileRequired => "Mobile Number is required",
        ContactError::InvalidMobile => "Enter a valid 10-digit mobile number",
        ContactError::PincodeRequired => "Pincode is required",
        ContactError::InvalidPincode => "Enter a valid 6-digit pincode",
    }
}

/// The address form as posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub country: String,
}

impl AddressForm {
    /// An empty form for a new address.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            ..Self::default()
        }
    }

    /// Prefill the form for editing.
    #[must_use]
    pub fn from_address(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            mobile_number: address.mobile_number.clone(),
            house_number: address.house_number.clone(),
            street: address.street.clone(),
            landmark: address.landmark.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
            country: address.country.clone(),
        }
    }

    /// Apply a state change, clearing a city that no longer belongs.
    pub fn set_state(&mut self, state: &str) {
        if self.state != state {
            self.state = state.to_owned();
            self.city.clear();
        }
    }

    /// Cities offered for the currently selected state.
    #[must_use]
    pub fn city_options(&self) -> &'static [&'static str] {
        cities(&self.state)
    }

    /// Check every field, collecting all failures at once.
    #[must_use]
    pub fn errors(&self) -> AddressErrors {
        let mut errors = AddressErrors::default();
        if self.full_name.trim().is_empty() {
            errors.full_name = Some("Full Name is required");
        }
        if let Err(e) = MobileNumber::parse(&self.mobile_number) {
            errors.mobile_number = Some(contact_message(&e));
        }
        if self.house_number.trim().is_empty() {
            errors.house_number = Some("House/Flat No is required");
        }
        if self.street.trim().is_empty() {
            errors.street = Some("Street/Area is required");
        }
        if self.state.trim().is_empty() || cities(&self.state).is_empty() {
            errors.state = Some("Please select a state");
        }
        if !cities(&self.state).contains(&self.city.as_str()) {
            errors.city = Some("Please select a city");
        }
        if let Err(e) = Pincode::parse(&self.pincode) {
            errors.pincode = Some(contact_message(&e));
        }
        errors
    }

    /// Validate into the API body.
    ///
    /// # Errors
    ///
    /// Returns every field error when the form is invalid.
    pub fn validate(&self) -> Result<AddressInput, AddressErrors> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors);
        }
        let country = self.country.trim();
        Ok(AddressInput {
            full_name: self.full_name.trim().to_owned(),
            mobile_number: self.mobile_number.trim().to_owned(),
            house_number: self.house_number.trim().to_owned(),
            street: self.street.trim().to_owned(),
            landmark: self.landmark.trim().to_owned(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.trim().to_owned(),
            country: if country.is_empty() {
                DEFAULT_COUNTRY.to_owned()
            } else {
                country.to_owned()
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use macstorm_core::AddressId;

    fn valid() -> AddressForm {
        AddressForm {
            full_name: "Asha Rao".into(),
            mobile_number: "9876543210".into(),
            house_number: "12B".into(),
            street: "MG Road".into(),
            landmark: String::new(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: "411001".into(),
            country: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let input = valid().validate().unwrap();
        assert_eq!(input.country, "India");
        assert_eq!(input.city, "Pune");
    }

    #[test]
    fn test_blank_form_reports_every_field() {
        let errors = AddressForm::blank().errors();
        assert_eq!(
            errors.messages(),
            vec![
                "Full Name is required",
                "Mobile Number is required",
                "House/Flat No is required",
                "Street/Area is required",
                "Please select a city",
                "Please select a state",
                "Pincode is required",
            ]
        );
    }

    #[test]
    fn test_bad_mobile_and_pincode() {
        let form = AddressForm {
            mobile_number: "98765".into(),
            pincode: "4110".into(),
            ..valid()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.mobile_number, Some("Enter a valid 10-digit mobile number"));
        assert_eq!(errors.pincode, Some("Enter a valid 6-digit pincode"));
        assert_eq!(errors.messages().len(), 2);
    }

    #[test]
    fn test_city_must_belong_to_state() {
        let form = AddressForm {
            city: "Chennai".into(),
            ..valid()
        };
        assert_eq!(form.errors().city, Some("Please select a city"));
    }

    #[test]
    fn test_state_change_resets_city() {
        let mut form = valid();
        form.set_state("Maharashtra");
        assert_eq!(form.city, "Pune");
        form.set_state("Karnataka");
        assert!(form.city.is_empty());
        assert_eq!(form.city_options().len(), 4);
    }

    #[test]
    fn test_default_address_rule() {
        let mut first = Address::default();
        first.id = AddressId::new("a1");
        let mut second = Address::default();
        second.id = AddressId::new("a2");
        second.is_default = true;

        let list = vec![first.clone(), second];
        assert_eq!(default_address(&list).unwrap().id.as_str(), "a2");
        assert_eq!(default_address(&[first]).unwrap().id.as_str(), "a1");
        assert!(default_address(&[]).is_none());
    }

    #[test]
    fn test_states_listed() {
        assert_eq!(states().count(), 8);
        assert!(cities("Goa").is_empty());
    }
}
