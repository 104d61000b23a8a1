/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Default maximum size of a single uploaded file (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default per-user storage ceiling (1 GiB)
pub const DEFAULT_STORAGE_QUOTA_BYTES: i64 = 1024 * 1024 * 1024;

/// File extensions accepted by the upload endpoint when none are configured
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "json", "txt"];
