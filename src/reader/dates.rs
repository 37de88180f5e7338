use crate::constants::{DATE_1904_OFFSET_DAYS, SECONDS_PER_DAY, TIMESTAMP_FORMAT, UNIX_EPOCH_SERIAL};
use chrono::DateTime;

/// Converts a spreadsheet date serial to a `YYYY-MM-DD HH:MM:SS` string in UTC.
///
/// The integer part counts days, the fraction is the time of day. Serials of the
/// 1904 system are shifted onto the 1900 system first. A serial whose day part is
/// zero is read as a bare time of day relative to the Unix epoch.
///
/// Returns `None` for non-finite serials or ones outside the representable range.
pub fn serial_to_timestamp(value: f64, date1904: bool) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let day = value.floor();
    let time_secs = ((value - day) * SECONDS_PER_DAY).round() as i64;

    let mut days = day as i64;
    if date1904 {
        days = days.checked_add(DATE_1904_OFFSET_DAYS)?;
    }

    let seconds = if days != 0 {
        days.checked_sub(UNIX_EPOCH_SERIAL)?
            .checked_mul(SECONDS_PER_DAY as i64)?
            .checked_add(time_secs)?
    } else {
        time_secs
    };

    DateTime::from_timestamp(seconds, 0).map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_serial_is_unix_epoch() {
        assert_eq!(
            serial_to_timestamp(0.0, false).as_deref(),
            Some("1970-01-01 00:00:00")
        );
    }

    #[test]
    fn time_only_serial() {
        assert_eq!(
            serial_to_timestamp(0.5, false).as_deref(),
            Some("1970-01-01 12:00:00")
        );
    }

    #[test]
    fn known_date_serial() {
        assert_eq!(
            serial_to_timestamp(44166.0, false).as_deref(),
            Some("2020-12-01 00:00:00")
        );
        assert_eq!(
            serial_to_timestamp(44166.75, false).as_deref(),
            Some("2020-12-01 18:00:00")
        );
    }

    #[test]
    fn first_serial_of_1900_system() {
        assert_eq!(
            serial_to_timestamp(1.0, false).as_deref(),
            Some("1899-12-31 00:00:00")
        );
    }

    #[test]
    fn date1904_shifts_by_fixed_offset() {
        assert_eq!(
            serial_to_timestamp(44166.0, true).as_deref(),
            Some("2024-12-02 00:00:00")
        );
        assert_eq!(
            serial_to_timestamp(0.0, true).as_deref(),
            Some("1904-01-01 00:00:00")
        );
    }

    #[test]
    fn rounds_fraction_to_nearest_second() {
        // 1/3 of a day plus a hair
        assert_eq!(
            serial_to_timestamp(44166.333_334, false).as_deref(),
            Some("2020-12-01 08:00:00")
        );
    }

    #[test]
    fn non_finite_serial_is_rejected() {
        assert_eq!(serial_to_timestamp(f64::NAN, false), None);
        assert_eq!(serial_to_timestamp(f64::INFINITY, false), None);
    }
}
