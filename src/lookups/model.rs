use std::collections::HashSet;
use log::warn;
use serde::{Deserialize, Serialize};
use crate::utils::lenient_string;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gender {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorRecord {
    pub id: String,
    pub name: String,
    pub surgery_id: Option<String>,
    /// Only the prereqs API reports this.
    pub registration_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurgeryRecord {
    pub id: String,
    pub name: String,
}

impl SurgeryRecord {
    /// Stand-in for a surgery referenced by a doctor but missing from the payload.
    pub fn synthetic(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Surgery {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentType {
    pub id: String,
    pub name: String,
}

impl AppointmentType {
    /// Video and phone consults need no clinic.
    pub fn is_virtual(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("video") || name.contains("phone")
    }
}

/// Dropdown reference data for the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceData {
    pub genders: Vec<Gender>,
    pub doctors: Vec<DoctorRecord>,
    pub surgeries: Vec<SurgeryRecord>,
    pub appointment_types: Vec<AppointmentType>,
}

impl ReferenceData {
    pub fn appointment_type(&self, id: &str) -> Option<&AppointmentType> {
        self.appointment_types.iter().find(|t| t.id == id)
    }
}

/// Ids must be present, non-blank and not `0`.
fn usable_id(id: Option<String>) -> Option<String> {
    let id = id?.trim().to_string();
    (!id.is_empty() && id != "0").then_some(id)
}

fn usable_name(name: Option<String>) -> Option<String> {
    let name = name?.trim().to_string();
    (!name.is_empty()).then_some(name)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGender {
    #[serde(rename = "Id", default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "GenderName", default, deserialize_with = "lenient_string")]
    name: Option<String>,
}

impl RawGender {
    fn into_record(self) -> Option<Gender> {
        Some(Gender { id: usable_id(self.id)?, name: usable_name(self.name)? })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAppointmentType {
    #[serde(rename = "CaseTypeID", default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "CaseType", default, deserialize_with = "lenient_string")]
    name: Option<String>,
}

impl RawAppointmentType {
    fn into_record(self) -> Option<AppointmentType> {
        Some(AppointmentType { id: usable_id(self.id)?, name: usable_name(self.name)? })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSurgery {
    #[serde(rename = "SurgeryID", default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "SurgeryName", default, deserialize_with = "lenient_string")]
    name: Option<String>,
}

impl RawSurgery {
    fn into_record(self) -> Option<SurgeryRecord> {
        Some(SurgeryRecord { id: usable_id(self.id)?, name: usable_name(self.name)? })
    }
}

/// Doctor as sent by the lookup webhook (`GPID`/`GPName`).
#[derive(Debug, Deserialize)]
pub(crate) struct WebhookDoctor {
    #[serde(rename = "GPID", default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "GPName", default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(rename = "SurgeryID", default, deserialize_with = "lenient_string")]
    surgery_id: Option<String>,
}

impl WebhookDoctor {
    fn into_record(self) -> Option<DoctorRecord> {
        Some(DoctorRecord {
            id: usable_id(self.id)?,
            name: usable_name(self.name)?,
            surgery_id: usable_id(self.surgery_id),
            registration_type: None,
        })
    }
}

/// Doctor as sent by the prereqs API (`DoctorID`/`DoctorName`).
#[derive(Debug, Deserialize)]
pub(crate) struct PrereqDoctor {
    #[serde(rename = "DoctorID", default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "DoctorName", default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(rename = "SurgeryID", default, deserialize_with = "lenient_string")]
    surgery_id: Option<String>,
    #[serde(rename = "SurgeryName", default, deserialize_with = "lenient_string")]
    surgery_name: Option<String>,
    #[serde(rename = "RegisterationType", default, deserialize_with = "lenient_string")]
    registration_type: Option<String>,
}

impl PrereqDoctor {
    /// the doctor plus the surgery it names, if any
    fn into_records(self) -> Option<(DoctorRecord, Option<SurgeryRecord>)> {
        let surgery_id = usable_id(self.surgery_id);
        let surgery = surgery_id.clone()
            .zip(usable_name(self.surgery_name))
            .map(|(id, name)| SurgeryRecord { id, name });
        let doctor = DoctorRecord {
            id: usable_id(self.id)?,
            name: usable_name(self.name)?,
            surgery_id,
            registration_type: usable_name(self.registration_type),
        };
        Some((doctor, surgery))
    }
}

/// Body of the lookup webhook once unwrapped from its envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct WebhookLookups {
    #[serde(rename = "Gender", default)]
    gender: Vec<RawGender>,
    #[serde(rename = "Doctors", default)]
    doctors: Vec<WebhookDoctor>,
    #[serde(rename = "Surgeries", default)]
    surgeries: Vec<RawSurgery>,
    #[serde(rename = "AppointmentTypes", default)]
    appointment_types: Vec<RawAppointmentType>,
}

impl From<WebhookLookups> for ReferenceData {
    fn from(raw: WebhookLookups) -> Self {
        let doctors = raw.doctors.into_iter().filter_map(WebhookDoctor::into_record).collect::<Vec<_>>();
        let surgeries = raw.surgeries.into_iter().filter_map(RawSurgery::into_record).collect();
        Self {
            genders: raw.gender.into_iter().filter_map(RawGender::into_record).collect(),
            surgeries: complete_surgeries(surgeries, &doctors),
            doctors,
            appointment_types: raw.appointment_types.into_iter().filter_map(RawAppointmentType::into_record).collect(),
        }
    }
}

/// Body of the patient-info-prereqs API.
#[derive(Debug, Deserialize)]
pub(crate) struct PrereqLookups {
    #[serde(rename = "Gender", default)]
    gender: Vec<RawGender>,
    #[serde(rename = "Doctors", default)]
    doctors: Vec<PrereqDoctor>,
    #[serde(rename = "AppointmentTypes", default)]
    appointment_types: Vec<RawAppointmentType>,
}

impl From<PrereqLookups> for ReferenceData {
    fn from(raw: PrereqLookups) -> Self {
        let (doctors, named): (Vec<_>, Vec<_>) = raw.doctors.into_iter()
            .filter_map(PrereqDoctor::into_records)
            .unzip();
        let mut surgeries: Vec<SurgeryRecord> = Vec::new();
        // Doctors repeat their surgery; the last name given for an id wins.
        for surgery in named.into_iter().flatten() {
            match surgeries.iter_mut().find(|s| s.id == surgery.id) {
                Some(known) => known.name = surgery.name,
                None => surgeries.push(surgery),
            }
        }
        Self {
            genders: raw.gender.into_iter().filter_map(RawGender::into_record).collect(),
            surgeries: complete_surgeries(surgeries, &doctors),
            doctors,
            appointment_types: raw.appointment_types.into_iter().filter_map(RawAppointmentType::into_record).collect(),
        }
    }
}

/// Dedupe surgeries by id, keeping the first, and add a synthetic entry for
/// every surgery a doctor points at that the payload does not list.
fn complete_surgeries(surgeries: Vec<SurgeryRecord>, doctors: &[DoctorRecord]) -> Vec<SurgeryRecord> {
    let mut seen = HashSet::new();
    let mut complete = surgeries.into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect::<Vec<_>>();

    for doctor in doctors {
        if let Some(surgery_id) = &doctor.surgery_id {
            if seen.insert(surgery_id.clone()) {
                warn!("doctor [{}] references unlisted surgery [{}], naming it after its id", doctor.id, surgery_id);
                complete.push(SurgeryRecord::synthetic(surgery_id));
            }
        }
    }
    complete
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn webhook(value: serde_json::Value) -> ReferenceData {
        serde_json::from_value::<WebhookLookups>(value).unwrap().into()
    }

    #[test]
    fn records_without_id_or_name_are_dropped() {
        let data = webhook(json!({
            "Gender": [
                {"Id": 1, "GenderName": "Male"},
                {"Id": 0, "GenderName": "Unknown"},
                {"Id": 2, "GenderName": "  "},
                {"GenderName": "Other"}
            ],
            "Doctors": [
                {"GPID": 10, "GPName": "Dr. Byrne", "SurgeryID": 5},
                {"GPID": 0, "GPName": "Dr. Nobody", "SurgeryID": 5},
                {"GPID": 11, "GPName": "", "SurgeryID": 5}
            ],
            "AppointmentTypes": [
                {"CaseTypeID": 1, "CaseType": "Video Consult"},
                {"CaseTypeID": null, "CaseType": "Phone Consult"}
            ]
        }));
        assert_eq!(data.genders, vec![Gender { id: "1".into(), name: "Male".into() }]);
        assert_eq!(data.doctors.len(), 1);
        assert_eq!(data.doctors[0].surgery_id.as_deref(), Some("5"));
        assert_eq!(data.appointment_types.len(), 1);
    }

    #[test]
    fn surgeries_are_derived_from_doctors_when_absent() {
        let data = webhook(json!({
            "Doctors": [
                {"GPID": 10, "GPName": "Dr. Byrne", "SurgeryID": 5},
                {"GPID": 11, "GPName": "Dr. Walsh", "SurgeryID": 5},
                {"GPID": 12, "GPName": "Dr. Kelly", "SurgeryID": 7},
                {"GPID": 13, "GPName": "Dr. Ryan"}
            ]
        }));
        assert_eq!(data.surgeries, vec![SurgeryRecord::synthetic("5"), SurgeryRecord::synthetic("7")]);
        assert_eq!(data.surgeries[0].name, "Surgery 5");
    }

    #[test]
    fn listed_surgeries_keep_their_names_and_gaps_are_filled() {
        let data = webhook(json!({
            "Doctors": [
                {"GPID": 10, "GPName": "Dr. Byrne", "SurgeryID": "5"},
                {"GPID": 12, "GPName": "Dr. Kelly", "SurgeryID": 9}
            ],
            "Surgeries": [
                {"SurgeryID": 5, "SurgeryName": "Quay Street Surgery"},
                {"SurgeryID": 5, "SurgeryName": "Duplicate"}
            ]
        }));
        assert_eq!(data.surgeries, vec![
            SurgeryRecord { id: "5".into(), name: "Quay Street Surgery".into() },
            SurgeryRecord::synthetic("9"),
        ]);
    }

    #[test]
    fn prereq_doctors_use_their_own_field_names() {
        let raw: PrereqLookups = serde_json::from_value(json!({
            "Doctors": [
                {"DoctorID": 3, "DoctorName": "Dr. Lynch", "SurgeryID": 4, "SurgeryName": "Main Street Clinic", "RegisterationType": "GMS"},
                {"GPID": 8, "GPName": "Dr. Webhook"}
            ]
        }))
            .unwrap();
        let data = ReferenceData::from(raw);
        assert_eq!(data.doctors, vec![DoctorRecord {
            id: "3".into(),
            name: "Dr. Lynch".into(),
            surgery_id: Some("4".into()),
            registration_type: Some("GMS".into()),
        }]);
        assert_eq!(data.surgeries, vec![SurgeryRecord { id: "4".into(), name: "Main Street Clinic".into() }]);
    }

    #[test]
    fn prereq_surgery_takes_the_last_name_given() {
        let raw: PrereqLookups = serde_json::from_value(json!({
            "Doctors": [
                {"DoctorID": 1, "DoctorName": "Dr. Lynch", "SurgeryID": 4, "SurgeryName": "Main St Clinic"},
                {"DoctorID": 2, "DoctorName": "Dr. Quinn", "SurgeryID": 6, "SurgeryName": "Harbour Practice"},
                {"DoctorID": 3, "DoctorName": "Dr. Moran", "SurgeryID": 4, "SurgeryName": "Main Street Clinic"},
                {"DoctorID": 4, "DoctorName": "Dr. Healy", "SurgeryID": 4}
            ]
        }))
            .unwrap();
        let data = ReferenceData::from(raw);
        assert_eq!(data.surgeries, vec![
            SurgeryRecord { id: "4".into(), name: "Main Street Clinic".into() },
            SurgeryRecord { id: "6".into(), name: "Harbour Practice".into() },
        ]);
    }

    #[test]
    fn virtual_appointment_types_are_video_or_phone() {
        let video = AppointmentType { id: "1".into(), name: "Video Consult".into() };
        let phone = AppointmentType { id: "2".into(), name: "PHONE consult".into() };
        let ftf = AppointmentType { id: "3".into(), name: "Face to Face".into() };
        assert!(video.is_virtual());
        assert!(phone.is_virtual());
        assert!(!ftf.is_virtual());
    }
}
