use chrono::{SecondsFormat, Utc};

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
