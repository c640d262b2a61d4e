//! Integration tests for `LookupClient` against a local `wiremock` server.

use std::time::Duration;
use serde_json::json;
use tokio::sync::Mutex;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carehq_booking::config::LookupConfig;
use carehq_booking::form::BookingForm;
use carehq_booking::lookups::{self, LookupClient, LookupError, LookupSource};
use carehq_booking::selection::GpSurgerySelection;

const WEBHOOK_PATH: &str = "/webhook/lookups";
const PREREQS_PATH: &str = "/AppBooking/GetPatientInfoPreReqs";

fn client(server: &MockServer, max_retries: usize) -> LookupClient {
    LookupClient::new(LookupConfig {
        webhook_url: format!("{}{WEBHOOK_PATH}", server.uri()),
        prereqs_url: format!("{}{PREREQS_PATH}", server.uri()),
        max_retries,
        timeout: Duration::from_secs(5),
    })
        .expect("failed to build test LookupClient")
}

fn webhook_lookups() -> serde_json::Value {
    json!({
        "Gender": [{"Id": 1, "GenderName": "Female"}, {"Id": 2, "GenderName": "Male"}],
        "Doctors": [
            {"GPID": 10, "GPName": "Dr. Byrne", "SurgeryID": 5},
            {"GPID": "11", "GPName": "Dr. Walsh", "SurgeryID": "5"},
            {"GPID": 12, "GPName": "Dr. Kelly", "SurgeryID": 7},
            {"GPID": 0, "GPName": "Nobody"}
        ],
        "Surgeries": [{"SurgeryID": 5, "SurgeryName": "Harbour Practice"}],
        "AppointmentTypes": [
            {"CaseTypeID": 1, "CaseType": "Video Consult"},
            {"CaseTypeID": 2, "CaseType": "Face to Face"}
        ]
    })
}

#[tokio::test]
async fn webhook_string_payload_in_array_is_unwrapped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({"workflowtype": "lookups", "source": "Spectrum IRE Booking System"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"data": webhook_lookups().to_string()}])))
        .expect(1)
        .mount(&server)
        .await;

    let data = client(&server, 0).fetch_webhook().await.unwrap();

    assert_eq!(data.genders.len(), 2);
    assert_eq!(data.doctors.len(), 3, "doctor with id 0 is dropped");
    assert_eq!(data.appointment_types.len(), 2);
    let surgeries = data.surgeries.iter().map(|s| (s.id.as_str(), s.name.as_str())).collect::<Vec<_>>();
    assert_eq!(surgeries, vec![("5", "Harbour Practice"), ("7", "Surgery 7")]);
}

#[tokio::test]
async fn webhook_root_payload_drives_the_dropdowns() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(webhook_lookups()))
        .mount(&server)
        .await;

    let data = client(&server, 0).fetch_webhook().await.unwrap();
    let mut selection = GpSurgerySelection::default();

    assert_eq!(selection.on_doctor_selected(&data, "12"), "7");
    selection.on_surgery_selected("5");
    assert_eq!(selection.gp(), "");
    let names = selection.available_doctors(&data).into_iter().map(|d| d.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Dr. Byrne", "Dr. Walsh"]);
}

#[tokio::test]
async fn unrecognized_webhook_payload_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let err = client(&server, 0).fetch_webhook().await.unwrap_err();
    assert!(matches!(err, LookupError::UnrecognizedShape { .. }), "{err}");
}

#[tokio::test]
async fn prereqs_doctors_carry_their_surgeries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PREREQS_PATH))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Gender": [{"Id": 1, "GenderName": "Female"}],
            "Doctors": [
                {"DoctorID": 20, "DoctorName": "Dr. Nolan", "SurgeryID": 9, "SurgeryName": "Quay Street Surgery", "RegisterationType": "GMS"},
                {"DoctorID": 21, "DoctorName": "Dr. Ryan", "SurgeryID": 9, "SurgeryName": "Quay Street Surgery"},
                {"DoctorID": 22, "DoctorName": "Dr. Doyle", "SurgeryID": 4}
            ],
            "AppointmentTypes": [{"CaseTypeID": 3, "CaseType": "Phone Consult"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = client(&server, 0).fetch_prereqs().await.unwrap();

    assert_eq!(data.doctors.len(), 3);
    assert_eq!(data.doctors[0].registration_type.as_deref(), Some("GMS"));
    let surgeries = data.surgeries.iter().map(|s| (s.id.as_str(), s.name.as_str())).collect::<Vec<_>>();
    assert_eq!(surgeries, vec![("9", "Quay Street Surgery"), ("4", "Surgery 4")]);
    assert_eq!(data.surgery_for_doctor("21"), Some("9"));
    assert!(data.appointment_type("3").unwrap().is_virtual());
}

#[tokio::test]
async fn non_success_status_is_reported_without_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PREREQS_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 0).fetch_prereqs().await.unwrap_err();
    match err {
        LookupError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected UnexpectedStatus, got: {other}"),
    }
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": webhook_lookups()})))
        .expect(1)
        .mount(&server)
        .await;

    let data = client(&server, 2).fetch_webhook().await.unwrap();
    assert_eq!(data.genders.len(), 2);
}

#[tokio::test]
async fn failed_load_leaves_its_message_on_the_form() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PREREQS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    let form = Mutex::new(BookingForm::new());
    let err = lookups::load_for_form(&client(&server, 0), LookupSource::Prereqs, &form).await.unwrap_err();

    let form = form.into_inner();
    assert!(matches!(err, LookupError::UnexpectedStatus { status: 500, .. }), "{err}");
    assert_eq!(form.status.lookups_error, Some(err.to_string()));
    assert!(!form.status.loading_lookups);
}

#[tokio::test]
async fn successful_load_clears_the_previous_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(webhook_lookups()))
        .expect(1)
        .mount(&server)
        .await;

    let form = Mutex::new(BookingForm::new());
    form.lock().await.status.lookups_error = Some("HTTP error: timed out".into());
    let data = lookups::load_for_form(&client(&server, 0), LookupSource::Webhook, &form).await.unwrap();

    let form = form.into_inner();
    assert_eq!(data.genders.len(), 2);
    assert_eq!(form.status.lookups_error, None);
    assert!(!form.status.loading_lookups);
}
