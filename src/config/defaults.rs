/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./active-row.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_CONNECT_TIMEOUT: &str = "5s";
pub const DEFAULT_ACQUIRE_TIMEOUT: &str = "3s";
pub const DEFAULT_IDLE_TIMEOUT: &str = "10m";
pub const DEFAULT_MAX_LIFETIME: &str = "30m";
pub const DEFAULT_SQLX_LOGGING: bool = true;
pub const DEFAULT_SQLX_LOGGING_LEVEL: &str = "debug";

// Environment overrides
pub const ENV_PREFIX: &str = "ACTIVE_ROW_DATABASE_";

// Row defaults
pub const DEFAULT_ID_COLUMN: &str = "id";
pub const DEFAULT_TIME_CREATED_COLUMN: &str = "time_created";
pub const DEFAULT_TIME_UPDATED_COLUMN: &str = "time_updated";
pub const DEFAULT_TIME_DELETED_COLUMN: &str = "time_deleted";

// Pagination defaults
pub const DEFAULT_PAGINATION_LIMIT: u64 = 20;
pub const DEFAULT_PAGINATION_PAGE: u64 = 1;
