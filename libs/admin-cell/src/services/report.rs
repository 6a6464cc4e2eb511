use chrono::NaiveDate;

use directory_cell::DoctorRecord;

use crate::models::DoctorReport;

const NOT_AVAILABLE: &str = "N/A";

impl DoctorReport {
    pub fn from_record(record: &DoctorRecord, generated_on: NaiveDate) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        let location = match (&record.city, record.location) {
            (Some(city), Some(p)) => format!("{} ({}, {})", city, p.latitude, p.longitude),
            (Some(city), None) => city.clone(),
            (None, Some(p)) => format!("{}, {}", p.latitude, p.longitude),
            (None, None) => "Location not available".to_string(),
        };

        Self {
            generated_on,
            full_name: record.name().to_string(),
            email: text(&record.email),
            profession: text(&record.profession),
            gender: text(&record.gender),
            phone: text(&record.phone),
            fax: text(&record.fax),
            location,
            map_link: record
                .location
                .map(|p| format!("https://maps.google.com/?q={},{}", p.latitude, p.longitude)),
            rating: record
                .rating
                .map(|r| r.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            status: if record.is_suspended { "Suspended" } else { "Active" }.to_string(),
            working_hours: record
                .working_hours
                .as_ref()
                .map(|h| format!("{} - {}", h.start, h.end))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            bio: text(&record.bio),
        }
    }

    /// Plain-text rendering suitable for printing or saving.
    pub fn render(&self) -> String {
        let map_line = self
            .map_link
            .as_ref()
            .map(|link| format!("Map: {}\n", link))
            .unwrap_or_default();

        format!(
            "Doctor Profile Report\n\
             Generated on {generated}\n\
             \n\
             Personal Information\n\
             Full Name: {name}\n\
             Profession: {profession}\n\
             Gender: {gender}\n\
             Status: {status}\n\
             Rating: {rating}\n\
             \n\
             Contact Information\n\
             Email: {email}\n\
             Phone: {phone}\n\
             Fax: {fax}\n\
             Location: {location}\n\
             {map_line}\
             Working Hours: {hours}\n\
             \n\
             Bio\n\
             {bio}",
            generated = self.generated_on.format("%Y-%m-%d"),
            name = self.full_name,
            profession = self.profession,
            gender = self.gender,
            status = self.status,
            rating = self.rating,
            email = self.email,
            phone = self.phone,
            fax = self.fax,
            location = self.location,
            map_line = map_line,
            hours = self.working_hours,
            bio = self.bio,
        )
    }
}

pub fn render_report(record: &DoctorRecord, generated_on: NaiveDate) -> String {
    DoctorReport::from_record(record, generated_on).render()
}
