use chrono::prelude::*;
use chrono_tz::Tz;

/// The wall-clock fields of an instant that recurring `Reminder`s are matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub hour: u32,
    pub minute: u32,
    pub weekday: Weekday,
    pub day_of_month: u32,
}

impl WallClock {
    pub fn from_timestamp_millis(timestamp: i64, tz: &Tz) -> Self {
        let date = to_datetime(timestamp, tz);
        Self {
            hour: date.hour(),
            minute: date.minute(),
            weekday: date.weekday(),
            day_of_month: date.day(),
        }
    }
}

pub fn to_datetime(timestamp: i64, tz: &Tz) -> DateTime<Tz> {
    Utc.timestamp_millis_opt(timestamp)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .with_timezone(tz)
}

// 09:05:00
pub fn format_time(timestamp: i64, tz: &Tz) -> String {
    to_datetime(timestamp, tz).format("%H:%M:%S").to_string()
}

// 01/02/2024
pub fn format_date(timestamp: i64, tz: &Tz) -> String {
    to_datetime(timestamp, tz).format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    // Mon Jan 01 2024 09:05:07 UTC
    const TS: i64 = 1704099907000;

    #[test]
    fn it_extracts_wall_clock_fields() {
        let wc = WallClock::from_timestamp_millis(TS, &Tz::UTC);
        assert_eq!(wc.hour, 9);
        assert_eq!(wc.minute, 5);
        assert_eq!(wc.weekday, Weekday::Mon);
        assert_eq!(wc.day_of_month, 1);

        let wc = WallClock::from_timestamp_millis(TS, &chrono_tz::Asia::Ho_Chi_Minh);
        assert_eq!(wc.hour, 16);
        assert_eq!(wc.minute, 5);
    }

    #[test]
    fn it_formats_time_and_date() {
        assert_eq!(format_time(TS, &Tz::UTC), "09:05:07");
        assert_eq!(format_date(TS, &Tz::UTC), "01/01/2024");
        assert_eq!(format_date(TS + 1000 * 60 * 60 * 24 * 40, &Tz::UTC), "10/02/2024");
    }
}
