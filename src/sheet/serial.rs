use crate::sheet::cell::Scalar;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised when a value cannot be interpreted as a serial day-count.
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Cannot convert '{0}' to a serial date")]
    NotNumeric(String),
}

/// Day zero of the serial number format used by spreadsheet services.
fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .expect("NaiveDate literal")
        .and_hms_opt(0, 0, 0)
        .expect("NaiveTime literal")
}

/// Converts a serial day-count into a calendar instant. Whole and fractional
/// days become seconds from the 1899-12-30 epoch, rounded to the nearest second.
pub fn to_datetime(serial: f64) -> NaiveDateTime {
    epoch() + Duration::seconds((serial * 86_400f64).round() as i64)
}

/// Coerces a scalar into a serial day-count and converts it. Native numbers
/// pass through, numeric-looking text is parsed, anything else fails.
pub fn convert(scalar: &Scalar) -> Result<NaiveDateTime, SerialError> {
    let serial = match scalar {
        Scalar::Number(number) => *number,
        Scalar::Text(text) => text
            .parse::<f64>()
            .map_err(|_| SerialError::NotNumeric(text.to_owned()))?,
        Scalar::Bool(value) => return Err(SerialError::NotNumeric(value.to_string())),
    };
    Ok(to_datetime(serial))
}
