//! Wire-level constants of the Instant On 1830 web management interface.
//!
//! These values mirror what the switch firmware expects on the wire. They are
//! not meant to be tuned; changing any of them breaks compatibility with the
//! device.

use std::time::Duration;

/// Default HTTP port of the management interface. The device speaks plain HTTP.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Endpoint describing whether the device mandates encrypted logins.
///
/// The braces are part of the literal query string the firmware matches on.
pub const ENCRYPTION_SETTINGS_PATH: &str = "device/wcd?{EncryptionSetting}";

/// Login endpoint, relative to the host root.
///
/// Unlike the download endpoint it is not placed under the session prefix.
pub const LOGIN_PATH: &str = "./system.xml?action=login";

/// Path segment that follows the session prefix in every redirect target.
pub const SESSION_MARKER: &str = "hpe/";

/// Download endpoint below the session prefix.
pub const DOWNLOAD_PATH: &str = "hpe/http_download";

/// `action` value selecting the running configuration.
pub const RUNNING_CONFIG_ACTION: u8 = 2;

/// `action` value selecting the startup configuration.
pub const STARTUP_CONFIG_ACTION: u8 = 3;

/// `ssd` value required by the download endpoint.
pub const DOWNLOAD_SSD: u8 = 4;

/// Startup configuration bodies of this many characters or fewer are treated
/// as "not delivered".
pub const STARTUP_CONFIG_MIN_LEN: usize = 100;

/// Timeout for the startup configuration download, the only bounded request.
pub const STARTUP_CONFIG_TIMEOUT: Duration = Duration::from_secs(30);

/// `statusCode` assumed when a status response does not carry one.
pub const MISSING_STATUS_CODE: i64 = 500;

/// `statusString` assumed when a status response does not carry one.
pub const MISSING_STATUS_MESSAGE: &str = "ERRORS";
