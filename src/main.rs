use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, WrapErr};
use futures::StreamExt;
use log::{error, info};
use tokio::sync::Mutex;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use carehq_booking::address::{AddressResolver, Coordinates, ResolvedAddress};
use carehq_booking::booking::{self, AppointmentKind};
use carehq_booking::config::{LookupConfig, ResolverConfig, SmsConfig};
use carehq_booking::eircode;
use carehq_booking::form::BookingForm;
use carehq_booking::geolocation::{self, FixedPosition, Geolocator};
use carehq_booking::lookups::{self, LookupClient, ReferenceData};
use carehq_booking::record::Record;
use carehq_booking::selection::GpSurgerySelection;
use carehq_booking::sms::{SmsClient, SmsMessage};

#[derive(Debug, Parser)]
#[command(name = "carehq-booking", version)]
#[command(about = "Eircode, address and reference-data tools for the booking flow")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate an Eircode and resolve its address
    Eircode { code: String },
    /// Resolve an address for a position
    Locate {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Fetch the dropdown reference data
    Lookups {
        #[arg(long, value_enum, default_value_t = LookupSource::Webhook)]
        source: LookupSource,
        /// Only list GPs of this surgery
        #[arg(long)]
        surgery: Option<String>,
        /// Show the surgery a GP selection forces
        #[arg(long)]
        gp: Option<String>,
    },
    /// Resolve every Eircode in a file, one per line, into a CSV
    Batch {
        file: PathBuf,
        #[arg(long, default_value = "result/addresses.csv")]
        out: PathBuf,
        #[arg(long, default_value_t = 5)]
        concurrency: usize,
    },
    /// Show slots and the fee for an appointment
    Slots {
        /// Video or phone consult
        #[arg(long = "virtual")]
        is_virtual: bool,
        #[arg(long)]
        clinic: Option<u32>,
    },
    /// Send an SMS through the booking backend
    Sms {
        #[arg(long)]
        to: String,
        #[arg(long)]
        message: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LookupSource {
    Webhook,
    Prereqs,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(e) = color_eyre::install() {
        eprintln!("cannot install error report handler: {e:?}");
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default())
        .init();

    if let Err(e) = run(Cli::parse()).await {
        error!("Error: {:?}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> color_eyre::Result<()> {
    match cli.command {
        Commands::Eircode { code } => {
            let resolver = AddressResolver::new(ResolverConfig::from_env())?;
            let resolved = resolver.resolve_by_eircode(&code).await?;
            print_address(&resolved);
        }
        Commands::Locate { latitude, longitude } => {
            let resolver = AddressResolver::new(ResolverConfig::from_env())?;
            let mut geolocator = Geolocator::new(FixedPosition(Coordinates::new(latitude, longitude)));
            let form = Mutex::new(BookingForm::new());
            geolocation::fill_current_location(&mut geolocator, &resolver, &form).await?;
            let form = form.into_inner();
            let current = &form.current;
            println!("{} {}, {}, {} {}", current.building, current.street, current.city, current.country, current.eircode);
        }
        Commands::Lookups { source, surgery, gp } => {
            let client = LookupClient::new(LookupConfig::from_env())?;
            let source = match source {
                LookupSource::Webhook => lookups::LookupSource::Webhook,
                LookupSource::Prereqs => lookups::LookupSource::Prereqs,
            };
            let form = Mutex::new(BookingForm::new());
            let data = lookups::load_for_form(&client, source, &form).await?;
            print_lookups(&data, surgery.as_deref(), gp.as_deref());
        }
        Commands::Batch { file, out, concurrency } => {
            let eircodes = read_eircodes(&file)?;
            info!("resolving [{}] eircodes from [{}]", eircodes.len(), file.display());
            let resolver = AddressResolver::new(ResolverConfig::from_env())?;
            let records = resolve_all(&resolver, eircodes, concurrency.max(1)).await;
            let resolved = records.iter().filter(|r| r.is_resolved()).count();
            info!("resolved [{resolved}/{}], saving records to [{}]", records.len(), out.display());
            save_records(records, &out)?;
        }
        Commands::Slots { is_virtual, clinic } => {
            let kind = if is_virtual { AppointmentKind::Virtual } else { AppointmentKind::FaceToFace };
            let clinic = match clinic {
                Some(id) => match booking::clinic(id) {
                    Some(clinic) => Some(clinic),
                    None => bail!("no clinic with id [{id}]"),
                },
                None => None,
            };
            if kind == AppointmentKind::FaceToFace && clinic.is_none() {
                for clinic in &booking::CLINICS {
                    println!("{:>2}  {:<24} {:>7} {:>4}  {}", clinic.id, clinic.name, clinic.distance, clinic.price, clinic.rating);
                }
                return Ok(());
            }
            for slot in booking::available_time_slots(kind, clinic) {
                println!("{slot}");
            }
            println!("fee: £{}", booking::payment_amount(kind, clinic));
            println!("reference: {}", booking::booking_reference());
        }
        Commands::Sms { to, message } => {
            let sms = SmsMessage::new(&to, &message)?;
            let client = SmsClient::new(SmsConfig::from_env())?;
            match client.send(&sms).await? {
                Some(sid) => println!("SMS sent successfully! SID: {sid}"),
                None => println!("SMS sent successfully!"),
            }
        }
    }
    Ok(())
}

fn print_address(resolved: &ResolvedAddress) {
    let address = &resolved.address;
    println!("building: {}", address.building);
    println!("street:   {}", address.street);
    println!("city:     {}", address.city);
    println!("country:  {}", address.country);
    println!("postcode: {}", address.postcode);
    println!("source:   {}", resolved.source);
}

fn print_lookups(data: &ReferenceData, surgery: Option<&str>, gp: Option<&str>) {
    println!(
        "{} genders, {} doctors, {} surgeries, {} appointment types",
        data.genders.len(),
        data.doctors.len(),
        data.surgeries.len(),
        data.appointment_types.len(),
    );

    let mut selection = GpSurgerySelection::default();
    if let Some(surgery) = surgery {
        selection.on_surgery_selected(surgery);
    }
    if let Some(gp) = gp {
        let forced = selection.on_doctor_selected(data, gp);
        println!("GP [{gp}] belongs to surgery [{forced}]");
    }
    for doctor in selection.available_doctors(data) {
        let surgery = doctor.surgery_id.as_deref().unwrap_or("-");
        println!("{:>6}  {:<32} surgery {surgery}", doctor.id, doctor.name);
    }
}

/// One code per line; blank lines and `#` comments are skipped.
fn read_eircodes(path: &Path) -> color_eyre::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read eircodes from [{}]", path.display()))?;
    Ok(
        content.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(eircode::normalize)
            .collect()
    )
}

async fn resolve_all(resolver: &AddressResolver, eircodes: Vec<String>, concurrency: usize) -> Vec<Record> {
    let total = eircodes.len();
    futures::stream::iter(eircodes).enumerate().map(|(idx, code)| {
        async move {
            info!("[{}/{total}] resolving [{code}]", idx + 1);
            let result = resolver.resolve_by_eircode(&code).await;
            if let Err(e) = &result {
                error!("cannot resolve [{code}]: {e}");
            }
            Record::from_result(code, result)
        }
    })
        .buffer_unordered(concurrency)
        .collect::<Vec<_>>()
        .await
}

/// write result to CSV file
fn save_records(mut records: Vec<Record>, save_path: impl AsRef<Path>) -> color_eyre::Result<()> {
    records.sort_by(|r1, r2| r1.eircode.cmp(&r2.eircode));
    if let Some(parent) = save_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = csv::Writer::from_path(save_path)?;
    for record in &records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
