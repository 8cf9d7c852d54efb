/// Processes are identified by random (v4) UUIDs generated on registration.
pub type ProcessId = uuid::Uuid;

/// Groups share the process identifier scheme.
pub type GroupId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
