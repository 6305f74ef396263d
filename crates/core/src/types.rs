/// All timestamps are UTC; the backends speak RFC 3339.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
