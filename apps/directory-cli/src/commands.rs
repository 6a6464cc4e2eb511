use chrono::{DateTime, Local, Utc};

use admin_cell::{
    dashboard_summary, render_report, DoctorAdminService, DoctorForm, ImageUpload,
};
use auth_cell::{AccountService, LoginForm, Registration, SessionStore};
use booking_cell::{BookingRequest, BookingService, Requester, SystemMailComposer};
use directory_cell::{
    build_index, is_available_now, nearby, to_markers, DirectoryAudience, DirectoryLoader,
    DirectoryState, DoctorRecord, GeoPoint, SearchSurface, WorkingHours, DEFAULT_MAP_CENTER,
};
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::cli::{AdminLogin, Command, Credentials, DoctorArgs};

pub async fn run(command: Command, config: &AppConfig) -> Result<(), AppError> {
    if !config.is_configured() {
        return Err(AppError::Config("BACKEND_URL and BACKEND_ANON_KEY must be set".to_string()));
    }

    match command {
        Command::List { all } => {
            let audience = if all { DirectoryAudience::Admin } else { DirectoryAudience::Patient };
            let doctors = DirectoryLoader::new(config).load(audience).await?;
            if doctors.is_empty() {
                println!("No doctors available");
            }
            for doctor in &doctors {
                print_row(doctor);
            }
        }
        Command::Search { specialty, query, city } => {
            let surface = if city { SearchSurface::with_city() } else { SearchSurface::from_config(config) };
            let mut state = DirectoryState::new(DirectoryAudience::Patient, surface);
            state.refresh(&DirectoryLoader::new(config)).await;
            if let Some(message) = state.error() {
                return Err(AppError::Load(message.to_string()));
            }

            state.select_specialty(&specialty);
            state.set_query(&query);
            let visible = state.visible();
            if visible.is_empty() {
                println!("No doctors match your search");
            }
            for doctor in visible {
                print_row(doctor);
            }
        }
        Command::Specialties => {
            let doctors = DirectoryLoader::new(config).load(DirectoryAudience::Patient).await?;
            println!("{}", build_index(&doctors).join("\n"));
        }
        Command::Doctor { id } => {
            let doctor = DirectoryLoader::new(config)
                .get_doctor(&id, DirectoryAudience::Patient)
                .await?;
            print_details(&doctor);
        }
        Command::Nearby { lat, lng, radius_km } => {
            let origin = match (lat, lng) {
                (Some(lat), Some(lng)) => GeoPoint::new(lat, lng)
                    .ok_or_else(|| AppError::Validation("Invalid coordinates".to_string()))?,
                _ => DEFAULT_MAP_CENTER,
            };
            let doctors = DirectoryLoader::new(config).load(DirectoryAudience::Patient).await?;
            for found in nearby(&doctors, origin, radius_km) {
                println!("{:>7.2} km  {}", found.distance_km, found.doctor.display_name());
            }
        }
        Command::Markers => {
            let doctors = DirectoryLoader::new(config).load(DirectoryAudience::Patient).await?;
            let markers = serde_json::to_string_pretty(&to_markers(&doctors))
                .map_err(|e| AppError::Load(e.to_string()))?;
            println!("{}", markers);
        }
        Command::Register { credentials, first_name, last_name, phone } => {
            let account = AccountService::new(config, SessionStore::new());
            let session = account
                .register(&Registration {
                    email: credentials.email,
                    password: credentials.password,
                    first_name,
                    last_name,
                    phone,
                })
                .await?;
            println!("Registered {}", session.user_id());
        }
        Command::Book { doctor_id, credentials, datetime, purpose } => {
            book(config, &doctor_id, credentials, &datetime, purpose).await?;
        }
        Command::ChangePassword { credentials, new_password, confirm_password } => {
            let account = signed_in(config, &credentials).await?;
            account
                .change_password(&credentials.password, &new_password, &confirm_password)
                .await?;
            println!("Password changed successfully");
        }
        Command::DeleteAccount { credentials } => {
            let account = signed_in(config, &credentials).await?;
            account.delete_account(&credentials.password).await?;
            println!("Account deleted successfully");
        }
        Command::Dashboard { admin } => {
            let token = admin_token(config, &admin).await?;
            let doctors = DirectoryLoader::new(config)
                .with_access_token(Some(token))
                .load(DirectoryAudience::Admin)
                .await?;
            let summary = dashboard_summary(&doctors);
            println!("Total number of doctors: {}", summary.total_doctors);
            println!("Total number of specialties: {}", summary.specialties);
            println!("Suspended: {}", summary.suspended);
            for doctor in &doctors {
                print_row(doctor);
            }
        }
        Command::AddDoctor { admin, doctor } => {
            let token = admin_token(config, &admin).await?;
            let image = match &doctor.image {
                Some(_) if !config.is_media_configured() => {
                    return Err(AppError::Config(
                        "MEDIA_UPLOAD_URL and MEDIA_UPLOAD_PRESET must be set to upload a picture".to_string(),
                    ));
                }
                Some(path) => {
                    let bytes = tokio::fs::read(path)
                        .await
                        .map_err(|e| AppError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("image");
                    Some(ImageUpload::from_file_name(name, bytes))
                }
                None => None,
            };
            let record = DoctorAdminService::new(config)
                .with_access_token(Some(token))
                .create_doctor(&doctor_form(&doctor), image.as_ref())
                .await?;
            println!("Added {} ({})", record.display_name(), record.id);
        }
        Command::Suspend { id, lift, admin } => {
            let token = admin_token(config, &admin).await?;
            let record = DoctorAdminService::new(config)
                .with_access_token(Some(token))
                .set_suspended(&id, !lift)
                .await?;
            let status = if record.is_suspended { "suspended" } else { "unsuspended" };
            println!("Doctor has been {}.", status);
        }
        Command::DeleteDoctor { id, admin } => {
            let token = admin_token(config, &admin).await?;
            DoctorAdminService::new(config)
                .with_access_token(Some(token))
                .delete_doctor(&id)
                .await?;
            println!("Doctor deleted");
        }
        Command::Report { id, admin } => {
            let token = admin_token(config, &admin).await?;
            let doctor = DirectoryLoader::new(config)
                .with_access_token(Some(token))
                .get_doctor(&id, DirectoryAudience::Admin)
                .await?;
            println!("{}", render_report(&doctor, Local::now().date_naive()));
        }
    }

    Ok(())
}

async fn book(
    config: &AppConfig,
    doctor_id: &str,
    credentials: Credentials,
    datetime: &str,
    purpose: String,
) -> Result<(), AppError> {
    let datetime = DateTime::parse_from_rfc3339(datetime)
        .map_err(|_| AppError::Validation("Please enter a valid date and time".to_string()))?
        .with_timezone(&Utc);

    let account = signed_in(config, &credentials).await?;
    let profile = account.current_profile().await?;
    let token = account.sessions().access_token();
    let user_id = account
        .sessions()
        .current()
        .map(|s| s.user.id)
        .unwrap_or_default();

    let doctor = DirectoryLoader::new(config)
        .with_access_token(token.clone())
        .get_doctor(doctor_id, DirectoryAudience::Patient)
        .await?;
    BookingService::check_bookable(&doctor, Local::now().time())?;

    let request = BookingRequest {
        requester: Requester {
            user_id,
            name: profile.full_name(),
            email: profile.email,
            phone: profile.phone,
        },
        datetime,
        purpose,
    };

    let receipt = BookingService::new(config)
        .with_access_token(token)
        .submit(&doctor, &request, &SystemMailComposer::new())
        .await?;

    println!("Appointment request sent! ({})", receipt.appointment_id);
    if let Some(e) = receipt.mail_error {
        eprintln!("{}", e.user_message());
    }
    Ok(())
}

async fn signed_in(config: &AppConfig, credentials: &Credentials) -> Result<AccountService, AppError> {
    let account = AccountService::new(config, SessionStore::new());
    let mut form = LoginForm::new(&credentials.email, &credentials.password);
    account.sign_in(&mut form).await?;
    Ok(account)
}

async fn admin_token(config: &AppConfig, admin: &AdminLogin) -> Result<String, AppError> {
    let account = AccountService::new(config, SessionStore::new());
    let mut form = LoginForm::new(&admin.email, &admin.password);
    let (session, _) = account.admin_sign_in(&mut form).await?;
    Ok(session.access_token)
}

fn doctor_form(args: &DoctorArgs) -> DoctorForm {
    let working_hours = match (&args.start, &args.end) {
        (Some(start), Some(end)) => Some(WorkingHours::new(start, end)),
        _ => None,
    };

    DoctorForm {
        full_name: args.name.clone(),
        email: args.email.clone(),
        profession: args.profession.clone(),
        gender: args.gender.clone(),
        phone: args.phone.clone(),
        city: args.city.clone(),
        rating: args.rating,
        working_hours,
        ..DoctorForm::default()
    }
}

fn print_row(doctor: &DoctorRecord) {
    let badge = is_available_now(doctor.working_hours.as_ref())
        .badge_label()
        .map(|label| format!(" [{}]", label))
        .unwrap_or_default();
    let suspended = if doctor.is_suspended { " (suspended)" } else { "" };

    println!(
        "{}  {}  {}{}{}",
        doctor.id,
        doctor.display_name(),
        doctor.profession.as_deref().unwrap_or("Not specified"),
        badge,
        suspended,
    );
}

fn print_details(doctor: &DoctorRecord) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("{}", doctor.display_name());
    println!("Profession: {}", field(&doctor.profession));
    println!("City: {}", field(&doctor.city));
    println!("Email: {}", field(&doctor.email));
    println!("Phone: {}", field(&doctor.phone));
    if let Some(rating) = doctor.rating {
        println!("Rating: {}", rating);
    }
    if let Some(hours) = &doctor.working_hours {
        let badge = is_available_now(Some(hours)).badge_label().unwrap_or("");
        println!("Working hours: {} - {} ({})", hours.start, hours.end, badge);
    }
    if let Some(bio) = &doctor.bio {
        println!("{}", bio);
    }
}
