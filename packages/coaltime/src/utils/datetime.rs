use chrono::{DateTime, Utc};

pub fn date_now() -> DateTime<Utc> {
  Utc::now()
}

pub fn date_format_precise(datetime: &DateTime<Utc>) -> String {
  datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
