//! Booking-flow core for an Irish out-of-hours GP service: Eircode
//! validation, address resolution, reference data for the GP/surgery
//! dropdowns, and the form logic that ties them together.

pub mod address;
pub mod booking;
pub mod config;
pub mod debounce;
pub mod eircode;
pub mod form;
pub mod geolocation;
pub mod lookups;
pub mod record;
pub mod selection;
pub mod sms;
pub mod utils;
