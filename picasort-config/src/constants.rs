//! Defaults and the managed-key registry shared by init and the loader.

/// Database name created by the bootstrap routine when nothing overrides it.
pub const DEFAULT_DATABASE_NAME: &str = "picasort";

/// Application role created by the bootstrap routine.
pub const DEFAULT_APP_USER: &str = "picasort";

/// Administrative role used for provisioning.
pub const DEFAULT_ADMIN_USER: &str = "postgres";

/// Maintenance database an admin connection targets while the application
/// database may not exist yet.
pub const DEFAULT_ADMIN_DATABASE: &str = "postgres";

/// Well-known secret mount path consulted for the application password when
/// no explicit `DATABASE_APP_PASSWORD`/`DATABASE_APP_PASSWORD_FILE` is set.
pub const DEFAULT_APP_PASSWORD_FILE: &str =
    "/run/secrets/picasort-db-password";

/// Keys `picasort-init init` owns inside `.env`. Everything else in the file
/// is preserved verbatim on merge.
pub const MANAGED_KEYS: &[&str] = &[
    "DATABASE_HOST",
    "DATABASE_PORT",
    "DATABASE_NAME",
    "DATABASE_ADMIN_USER",
    "DATABASE_ADMIN_PASSWORD",
    "DATABASE_APP_USER",
    "DATABASE_APP_PASSWORD",
    "DATABASE_URL",
    "DATABASE_URL_ADMIN",
    "PHOTO_ROOTS",
    "CACHE_DIR",
    "THUMBNAIL_CACHE_DIR",
];
