//! Clinic and slot selection, pricing and references for the booking step.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use crate::lookups::ReferenceData;

/// Fee for video and phone consultations.
pub const VIRTUAL_FEE: u32 = 35;
/// Fee for face-to-face consultations when the clinic's price is unreadable.
pub const DEFAULT_FEE: u32 = 45;

/// Evening slots, also offered to every virtual appointment.
pub const EVENING_SLOTS: [&str; 20] = [
    "17:00 - 17:15", "17:15 - 17:30", "17:30 - 17:45", "17:45 - 18:00",
    "18:00 - 18:15", "18:15 - 18:30", "18:30 - 18:45", "18:45 - 19:00",
    "19:00 - 19:15", "19:15 - 19:30", "19:30 - 19:45", "19:45 - 20:00",
    "20:00 - 20:15", "20:15 - 20:30", "20:30 - 20:45", "20:45 - 21:00",
    "21:00 - 21:15", "21:15 - 21:30", "21:30 - 21:45", "21:45 - 22:00",
];

const DOWNTOWN_SLOTS: [&str; 18] = [
    "17:00 - 17:15", "17:15 - 17:30", "17:30 - 17:45", "17:45 - 18:00",
    "18:00 - 18:15", "18:15 - 18:30", "18:30 - 18:45", "18:45 - 19:00",
    "19:00 - 19:15", "19:15 - 19:30", "19:30 - 19:45", "19:45 - 20:00",
    "20:00 - 20:15", "20:15 - 20:30", "20:30 - 20:45", "20:45 - 21:00",
    "21:00 - 21:15", "21:15 - 21:30",
];

const WELLNESS_SLOTS: [&str; 19] = [
    "17:00 - 17:15", "17:15 - 17:30", "17:30 - 17:45", "17:45 - 18:00",
    "18:00 - 18:15", "18:15 - 18:30", "18:30 - 18:45", "18:45 - 19:00",
    "19:00 - 19:15", "19:15 - 19:30", "19:30 - 19:45", "19:45 - 20:00",
    "20:00 - 20:15", "20:15 - 20:30", "20:30 - 20:45", "20:45 - 21:00",
    "21:00 - 21:15", "21:15 - 21:30", "21:30 - 21:45",
];

const CITY_CARE_SLOTS: [&str; 19] = [
    "17:00 - 17:15", "17:15 - 17:30", "17:30 - 17:45", "17:45 - 18:00",
    "18:00 - 18:15", "18:15 - 18:30", "18:30 - 18:45", "18:45 - 19:00",
    "19:00 - 19:15", "19:15 - 19:30", "19:30 - 19:45", "19:45 - 20:00",
    "20:00 - 20:15", "20:15 - 20:30", "20:30 - 20:45", "20:45 - 21:00",
    "21:00 - 21:15", "21:30 - 21:45", "21:45 - 22:00",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clinic {
    pub id: u32,
    pub name: &'static str,
    pub distance: &'static str,
    /// Display price, currency symbol included.
    pub price: &'static str,
    pub rating: f32,
    pub slots: &'static [&'static str],
}

pub static CLINICS: [Clinic; 5] = [
    Clinic {
        id: 1,
        name: "CareHQ Medical Centre",
        distance: "2.5 km",
        price: "£45",
        rating: 4.8,
        slots: &EVENING_SLOTS,
    },
    Clinic {
        id: 2,
        name: "Downtown Health Clinic",
        distance: "3.8 km",
        price: "£40",
        rating: 4.6,
        slots: &DOWNTOWN_SLOTS,
    },
    Clinic {
        id: 3,
        name: "City Care Medical",
        distance: "1.2 km",
        price: "£50",
        rating: 4.9,
        slots: &CITY_CARE_SLOTS,
    },
    Clinic {
        id: 4,
        name: "Wellness Center Plus",
        distance: "4.1 km",
        price: "£42",
        rating: 4.7,
        slots: &WELLNESS_SLOTS,
    },
    Clinic {
        id: 5,
        name: "Prime Health Clinic",
        distance: "2.8 km",
        price: "£48",
        rating: 4.8,
        slots: &EVENING_SLOTS,
    },
];

pub fn clinic(id: u32) -> Option<&'static Clinic> {
    CLINICS.iter().find(|c| c.id == id)
}

/// Clicking the selected clinic again deselects it.
pub fn toggle_clinic(selected: Option<u32>, clicked: u32) -> Option<u32> {
    if selected == Some(clicked) {
        None
    } else {
        Some(clicked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppointmentKind {
    Virtual,
    FaceToFace,
}

impl AppointmentKind {
    /// Kind of the appointment type selected in the form.
    ///
    /// Ids missing from the reference data fall back to the legacy `vc`/`pc`
    /// codes for video and phone consults.
    pub fn of(data: &ReferenceData, appointment_type_id: &str) -> Self {
        let is_virtual = match data.appointment_type(appointment_type_id) {
            Some(appointment_type) => appointment_type.is_virtual(),
            None => matches!(appointment_type_id, "vc" | "pc"),
        };
        if is_virtual {
            Self::Virtual
        } else {
            Self::FaceToFace
        }
    }
}

/// Virtual appointments always get the evening slots; face-to-face ones need a clinic.
pub fn available_time_slots(kind: AppointmentKind, clinic: Option<&Clinic>) -> &'static [&'static str] {
    match (kind, clinic) {
        (AppointmentKind::Virtual, _) => &EVENING_SLOTS,
        (AppointmentKind::FaceToFace, Some(clinic)) => clinic.slots,
        (AppointmentKind::FaceToFace, None) => &[],
    }
}

pub fn payment_amount(kind: AppointmentKind, clinic: Option<&Clinic>) -> u32 {
    if kind == AppointmentKind::Virtual {
        return VIRTUAL_FEE;
    }
    clinic
        .and_then(|c| {
            let digits = c.price.chars().filter(char::is_ascii_digit).collect::<String>();
            digits.parse::<u32>().ok()
        })
        .filter(|amount| *amount > 0)
        .unwrap_or(DEFAULT_FEE)
}

/// `BK` + the last 6 digits of the millisecond clock + 3 random digits.
pub fn booking_reference() -> String {
    let millis = Utc::now().timestamp_millis().rem_euclid(1_000_000);
    let random = rand::rng().random_range(0..1000);
    format!("BK{millis:06}{random:03}")
}

/// `SIR` + 9 random uppercase letters or digits.
pub fn payment_reference() -> String {
    let suffix = rand::rng()
        .sample_iter(Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect::<String>();
    format!("SIR{suffix}")
}
