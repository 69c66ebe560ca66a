use eyre::{eyre, Result};
use std::io::Write;
use time::{Date, OffsetDateTime};

pub fn read_input(label: &str) -> String {
    print!("{label}: ");
    let _ = std::io::stdout().flush();

    let mut value = String::new();
    let _ = std::io::stdin().read_line(&mut value);
    value.trim().to_string()
}

pub fn read_input_hidden(label: &str) -> String {
    rpassword::prompt_password(format!("{label}: ")).unwrap_or_default()
}

/// The leading calendar-day portion of a date string, with or without a
/// time-of-day part ("2024-01-15T10:30:00Z" -> "2024-01-15").
pub fn date_prefix(date: &str) -> &str {
    date.split('T').next().unwrap_or(date)
}

/// Today's calendar day in the wire format, "YYYY-MM-DD".
pub fn today() -> String {
    OffsetDateTime::now_utc().date().to_string()
}

/// Validates a user-supplied calendar day.
pub fn parse_day(value: &str) -> Result<Date> {
    let format = time::format_description::parse("[year]-[month]-[day]")
        .map_err(|e| eyre!("day format description: {e}"))?;
    Date::parse(value, &format).map_err(|_| eyre!("expected a date like 2024-01-15"))
}
