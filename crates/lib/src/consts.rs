/// Application name used for default directories.
pub const APP_NAME: &str = "runstore";

/// Implicit name of the single logs persistence.
pub const DEFAULT_PERSISTENCE: &str = "default";

/// Settings file name inside the config directory.
pub const CONFIG_FILENAME: &str = "stores.yaml";

/// Directory name of the default logs archive inside the data directory.
pub const ARCHIVE_DIR: &str = "logs-archive";

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "RUNSTORE_CONFIG";

/// Environment variable overriding the archive root.
pub const ARCHIVE_ROOT_ENV: &str = "RUNSTORE_ARCHIVE_ROOT";

/// Prefix of environment variables holding store secrets.
pub const SECRET_ENV_PREFIX: &str = "RUNSTORE_SECRET_";
