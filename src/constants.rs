// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";

// Session configuration
pub const SESSION_NAME: &str = "finance_session";
pub const SESSION_EXPIRY_DAYS: i64 = 3;
pub const MIN_SESSION_SECRET_LENGTH: usize = 64;

// Pagination defaults. Absent or unusable page/limit values fall back to
// these; limit is additionally capped so a single request cannot force an
// unbounded scan.
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

// Validation limits
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_TEXT_FIELD_LENGTH: usize = 255;

// Error messages
pub const ERR_DATABASE_ACCESS: &str = "Database access error";
pub const ERR_DATABASE_OPERATION: &str = "Database operation failed";
pub const ERR_NOT_LOGGED_IN: &str = "Not logged in";
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const ERR_INVALID_USER_ID: &str = "Invalid user ID";
pub const ERR_USER_NOT_FOUND: &str = "User ID does not exist";
pub const ERR_INVALID_DATE: &str = "Invalid date format";
