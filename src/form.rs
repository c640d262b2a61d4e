//! The booking form's state: one record per session, mutated field by field by
//! user input and by address resolution, reset when the flow completes.

use serde::Serialize;
use crate::address::{StructuredAddress, DEFAULT_COUNTRY};
use crate::lookups::ReferenceData;
use crate::selection::GpSurgerySelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationField {
    Building,
    Street,
    City,
    Country,
    Postcode,
    Eircode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ReasonForContact,
    FirstName,
    LastName,
    DateOfBirth,
    PhoneNumber,
    Email,
    Symptoms,
    GmsNumber,
    GmsExpiry,
    AppointmentType,
    Home(LocationField),
    Current(LocationField),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationFields {
    pub building: String,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postcode: String,
    pub eircode: String,
}

impl LocationFields {
    pub fn set(&mut self, field: LocationField, value: &str) {
        let slot = match field {
            LocationField::Building => &mut self.building,
            LocationField::Street => &mut self.street,
            LocationField::City => &mut self.city,
            LocationField::Country => &mut self.country,
            LocationField::Postcode => &mut self.postcode,
            LocationField::Eircode => &mut self.eircode,
        };
        *slot = value.to_string();
    }

    fn set_address(&mut self, address: &StructuredAddress) {
        self.building = address.building.clone();
        self.street = address.street.clone();
        self.city = address.city.clone();
        self.country = if address.country.is_empty() {
            DEFAULT_COUNTRY.to_string()
        } else {
            address.country.clone()
        };
        self.postcode = address.postcode.clone();
    }
}

/// Loading flags and messages of the form's async operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormStatus {
    pub loading_eircode: bool,
    pub loading_location: bool,
    pub loading_lookups: bool,
    /// Shown under the Eircode / location inputs.
    pub eircode_error: Option<String>,
    pub lookups_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingForm {
    pub reason_for_contact: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub email: String,
    pub symptoms: String,
    pub gms_number: String,
    pub gms_expiry: String,
    pub appointment_type: String,
    /// Raw Eircode search input, as typed.
    pub eircode: String,
    pub home: LocationFields,
    pub current: LocationFields,
    pub selection: GpSurgerySelection,
    pub use_home_as_current_location: bool,
    pub status: FormStatus,
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field, keeping the derived fields in step.
    pub fn update(&mut self, field: FormField, value: &str) {
        match field {
            FormField::ReasonForContact => self.reason_for_contact = value.to_string(),
            FormField::FirstName => {
                self.first_name = value.to_string();
                self.refresh_full_name();
            }
            FormField::LastName => {
                self.last_name = value.to_string();
                self.refresh_full_name();
            }
            FormField::DateOfBirth => self.date_of_birth = value.to_string(),
            FormField::PhoneNumber => self.phone_number = value.to_string(),
            FormField::Email => self.email = value.to_string(),
            FormField::Symptoms => self.symptoms = value.to_string(),
            FormField::GmsNumber => self.gms_number = value.to_string(),
            FormField::GmsExpiry => self.gms_expiry = value.to_string(),
            FormField::AppointmentType => self.appointment_type = value.to_string(),
            FormField::Home(field) => {
                self.home.set(field, value);
                if self.use_home_as_current_location {
                    self.current.set(field, value);
                }
            }
            FormField::Current(field) => self.current.set(field, value),
        }
    }

    fn refresh_full_name(&mut self) {
        self.full_name = format!("{} {}", self.first_name, self.last_name).trim().to_string();
    }

    /// Checking the box copies every home field over the current location.
    pub fn set_use_home_as_current_location(&mut self, enabled: bool) {
        self.use_home_as_current_location = enabled;
        if enabled {
            self.current = self.home.clone();
        }
    }

    /// Returns the surgery value the GP forced.
    pub fn select_gp(&mut self, data: &ReferenceData, gp_id: &str) -> String {
        self.selection.on_doctor_selected(data, gp_id).to_string()
    }

    pub fn select_surgery(&mut self, surgery_id: &str) {
        self.selection.on_surgery_selected(surgery_id);
    }

    /// Result of an Eircode lookup; `address.postcode` carries the Eircode.
    pub fn apply_eircode_address(&mut self, address: &StructuredAddress) {
        self.current.set_address(address);
        self.status.eircode_error = None;
    }

    /// Result of a coordinate lookup; its postcode also fills both Eircode inputs.
    pub fn apply_located_address(&mut self, address: &StructuredAddress) {
        self.current.set_address(address);
        self.current.eircode = address.postcode.clone();
        self.eircode = address.postcode.clone();
        self.status.eircode_error = None;
    }

    /// Emptying the Eircode input empties the address it filled.
    pub fn clear_current_location(&mut self) {
        let eircode = std::mem::take(&mut self.current.eircode);
        self.current = LocationFields { eircode, ..Default::default() };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
