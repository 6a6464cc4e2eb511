use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Doctor directory, booking and admin tools", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct Credentials {
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the patient directory, or every doctor with --all.
    List {
        #[clap(long)]
        all: bool,
    },
    /// Filter the directory by specialty chip and free-text query.
    Search {
        #[clap(long, default_value = "All")]
        specialty: String,
        #[clap(long, default_value = "")]
        query: String,
        /// Also match the city field.
        #[clap(long)]
        city: bool,
    },
    /// Print the specialty chips.
    Specialties,
    /// Show one doctor with the current availability badge.
    Doctor { id: String },
    /// Doctors within a radius of a point, nearest first. Without a point
    /// the default map centre is used.
    Nearby {
        #[clap(long, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,
        #[clap(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,
        #[clap(long, default_value_t = 10.0)]
        radius_km: f64,
    },
    /// Map markers as JSON.
    Markers,
    /// Create an account with a profile.
    Register {
        #[clap(flatten)]
        credentials: Credentials,
        #[clap(long)]
        first_name: String,
        #[clap(long)]
        last_name: String,
        #[clap(long)]
        phone: String,
    },
    /// Request an appointment and open the mail composer.
    Book {
        doctor_id: String,
        #[clap(flatten)]
        credentials: Credentials,
        /// RFC 3339 date and time.
        #[clap(long)]
        datetime: String,
        #[clap(long, default_value = "")]
        purpose: String,
    },
    ChangePassword {
        #[clap(flatten)]
        credentials: Credentials,
        #[clap(long)]
        new_password: String,
        #[clap(long)]
        confirm_password: String,
    },
    DeleteAccount {
        #[clap(flatten)]
        credentials: Credentials,
    },
    /// Admin: dashboard counts.
    Dashboard {
        #[clap(flatten)]
        admin: AdminLogin,
    },
    /// Admin: add a doctor.
    AddDoctor {
        #[clap(flatten)]
        admin: AdminLogin,
        #[clap(flatten)]
        doctor: DoctorArgs,
    },
    /// Admin: suspend a doctor, or lift the suspension with --lift.
    Suspend {
        id: String,
        #[clap(long)]
        lift: bool,
        #[clap(flatten)]
        admin: AdminLogin,
    },
    /// Admin: delete a doctor.
    DeleteDoctor {
        id: String,
        #[clap(flatten)]
        admin: AdminLogin,
    },
    /// Admin: printable doctor report.
    Report {
        id: String,
        #[clap(flatten)]
        admin: AdminLogin,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AdminLogin {
    #[clap(long = "admin-email")]
    pub email: String,
    #[clap(long = "admin-password")]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct DoctorArgs {
    #[clap(long)]
    pub name: String,
    #[clap(long = "doctor-email")]
    pub email: String,
    #[clap(long)]
    pub profession: String,
    #[clap(long, default_value = "")]
    pub gender: String,
    #[clap(long, default_value = "")]
    pub phone: String,
    #[clap(long, default_value = "")]
    pub city: String,
    #[clap(long, default_value_t = 0.0)]
    pub rating: f64,
    #[clap(long)]
    pub start: Option<String>,
    #[clap(long)]
    pub end: Option<String>,
    #[clap(long)]
    pub image: Option<PathBuf>,
}
