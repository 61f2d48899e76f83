/// Route component constants shared across crates
pub const GENERATE_ROUTE_COMPONENT: &str = "generate";
pub const GENERATE_ROUTE_PREFIX: &str = const_str::concat!("/", GENERATE_ROUTE_COMPONENT);

pub const HEALTHCHECK_ROUTE_COMPONENT: &str = "healthcheck";
pub const HEALTHCHECK_ROUTE_PREFIX: &str = const_str::concat!("/", HEALTHCHECK_ROUTE_COMPONENT);

/// Prefix of environment variables read into `Settings`.
pub const ENV_PREFIX: &str = "DAYSHEET";

/// Display zone used when the configured zone name does not resolve.
pub const FALLBACK_TIMEZONE: &str = "America/Chicago";

/// Allowed span of the hourly grid, in hours.
pub const MIN_HOUR_SPAN: u32 = 8;
pub const MAX_HOUR_SPAN: u32 = 12;

pub const DEFAULT_START_HOUR: u32 = 6;
pub const DEFAULT_END_HOUR: u32 = 17;

/// Number of days in the default window (start date inclusive).
pub const DEFAULT_WINDOW_DAYS: u32 = 7;
