use chrono::{DateTime, Datelike, Timelike, Utc};

#[derive(thiserror::Error, Debug)]
pub enum TimeError {
    #[error("epoch time {0} falls outside the representable calendar range")]
    OutOfRange(f64),
}
type Result<T> = std::result::Result<T, TimeError>;

// The serial date convention downstream counts whole days from 0000-01-01,
// which sits 366 days before the 0001-01-01 origin of the ordinal calendar.
const SERIAL_DAY_OFFSET: f64 = 366.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Per-observation absolute epoch seconds from the granule base time.
pub fn obs_epoch(base_time: f64, offsets: &[f64]) -> Vec<f64> {
    offsets.iter().map(|&offset| base_time + offset).collect()
}

/// UTC calendar time of an epoch second value.
pub fn to_datetime(epoch_secs: f64) -> Result<DateTime<Utc>> {
    let mut whole = epoch_secs.floor();
    let mut nanos = ((epoch_secs - whole) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        whole += 1.0;
        nanos = 0;
    }
    DateTime::from_timestamp(whole as i64, nanos).ok_or(TimeError::OutOfRange(epoch_secs))
}

/// Convert epoch seconds to the serial date used downstream: whole days
/// since 0000-01-01 plus the fraction of the day elapsed since midnight,
/// all in double precision.
pub fn datenum(epoch_secs: f64) -> Result<f64> {
    let datetime = to_datetime(epoch_secs)?;
    let days = datetime.num_days_from_ce() as f64 + SERIAL_DAY_OFFSET;
    let day_fraction = (datetime.num_seconds_from_midnight() as f64
        + datetime.nanosecond() as f64 * 1e-9)
        / SECONDS_PER_DAY;
    Ok(days + day_fraction)
}

/// [`datenum`] over a whole epoch array.
pub fn datenums(epoch_secs: &[f64]) -> Result<Vec<f64>> {
    epoch_secs.iter().map(|&secs| datenum(secs)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_epoch_anchor() {
        // datenum(1970, 1, 1) in the downstream environment
        assert_eq!(datenum(0.0).unwrap(), 719_529.0);
    }

    #[test]
    fn year_2000_anchor() {
        // 2000-01-01T00:00:00Z; datenum(2000, 1, 1) is 730486
        assert_eq!(datenum(946_684_800.0).unwrap(), 730_486.0);
    }

    #[test]
    fn noon_is_half_a_day() {
        let serial = datenum(946_684_800.0 + 43_200.0).unwrap();
        assert!((serial - 730_486.5).abs() < 1e-9);
    }

    #[test]
    fn base_plus_offset() {
        let epochs = obs_epoch(1_000.0, &[0.0, 0.5, 2.0]);
        assert_eq!(epochs, vec![1_000.0, 1_000.5, 1_002.0]);
    }

    #[test]
    fn datenums_keep_observation_order() {
        let serials = datenums(&[0.0, 86_400.0]).unwrap();
        assert_eq!(serials, vec![719_529.0, 719_530.0]);
    }

    #[test]
    fn calendar_round_trip() {
        let datetime = to_datetime(1_410_782_400.0).unwrap();
        assert_eq!(datetime.to_rfc3339(), "2014-09-15T12:00:00+00:00");
    }
}
