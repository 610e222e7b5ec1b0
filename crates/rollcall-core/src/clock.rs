use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC time truncated to milliseconds.
///
/// Stored timestamps are written with millisecond precision, so values handed
/// back from a write compare equal to the same value read back later.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Today's calendar date in UTC.
pub fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}
