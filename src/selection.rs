//! GP and surgery dropdowns.
//!
//! The two selections drive each other one way at a time: picking a GP forces
//! the surgery to that GP's practice, picking a surgery clears the GP so it is
//! re-picked from the narrowed list.

use log::debug;
use serde::Serialize;
use crate::lookups::{DoctorRecord, ReferenceData};

/// Surgery value meaning "no filter".
pub const ALL_SURGERIES: &str = "all";

impl ReferenceData {
    pub fn doctor(&self, doctor_id: &str) -> Option<&DoctorRecord> {
        self.doctors.iter().find(|d| d.id == doctor_id)
    }

    /// Surgery id of a doctor, if the doctor exists and has one.
    pub fn surgery_for_doctor(&self, doctor_id: &str) -> Option<&str> {
        self.doctor(doctor_id)?.surgery_id.as_deref()
    }

    /// Doctors practising at `surgery_id`; every doctor for `""` or `"all"`.
    pub fn filtered_doctors(&self, surgery_id: &str) -> Vec<&DoctorRecord> {
        let surgery_id = surgery_id.trim();
        if surgery_id.is_empty() || surgery_id == ALL_SURGERIES {
            return self.doctors.iter().collect();
        }
        self.doctors.iter()
            .filter(|d| d.surgery_id.as_deref() == Some(surgery_id))
            .collect()
    }
}

/// The GP and surgery dropdown values of one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GpSurgerySelection {
    gp: String,
    surgery: String,
}

impl GpSurgerySelection {
    pub fn gp(&self) -> &str {
        &self.gp
    }

    pub fn surgery(&self) -> &str {
        &self.surgery
    }

    /// Select a GP and force the surgery to match; returns the surgery value.
    ///
    /// An unknown GP, or one without a surgery, leaves the surgery empty.
    /// Clearing the GP (empty id) leaves the surgery untouched.
    pub fn on_doctor_selected(&mut self, data: &ReferenceData, doctor_id: &str) -> &str {
        self.gp = doctor_id.trim().to_string();
        if self.gp.is_empty() {
            return &self.surgery;
        }
        self.surgery = data.surgery_for_doctor(&self.gp).unwrap_or_default().to_string();
        debug!("GP [{}] selected, surgery set to [{}]", self.gp, self.surgery);
        &self.surgery
    }

    /// Select a surgery (or [`ALL_SURGERIES`]) and clear the GP.
    pub fn on_surgery_selected(&mut self, surgery_id: &str) {
        self.surgery = surgery_id.trim().to_string();
        self.gp.clear();
    }

    /// GPs offered under the current surgery value.
    pub fn available_doctors<'a>(&self, data: &'a ReferenceData) -> Vec<&'a DoctorRecord> {
        data.filtered_doctors(&self.surgery)
    }

    pub fn clear(&mut self) {
        self.gp.clear();
        self.surgery.clear();
    }
}
