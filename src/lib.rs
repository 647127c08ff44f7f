//! # instanton-backup - Configuration backups for Instant On switches
//!
//! `instanton-backup` logs into the web management interface of Aruba Instant
//! On 1830 switches and retrieves their running and startup configuration
//! for archival.
//!
//! ## Features
//!
//! - **Login Negotiation**: Plain logins, or RSA (PKCS#1 v1.5) encrypted
//!   credentials when the switch demands them
//! - **Session Discovery**: Follows the root redirect to find the per-login
//!   session prefix of the download endpoint
//! - **Tolerant Startup Download**: A startup configuration the device does not
//!   deliver is reported as absent instead of failing the backup
//! - **Hostname Labels**: Artifacts are named after the hostname configured on
//!   the switch
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use instanton_backup::session::SwitchSession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = SwitchSession::new("192.168.1.10", 80, "admin", "password")?;
//!     session.authenticate().await?;
//!
//!     let running = session.download_running_config().await?;
//!     let hostname = session.extract_hostname(&running);
//!     println!("{hostname}: {} bytes", running.len());
//!
//!     if let Some(startup) = session.download_startup_config().await? {
//!         println!("startup config: {} bytes", startup.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Main Components
//!
//! - [`session::SwitchSession`] - Login and downloads for one switch
//! - [`device`] - Typed parsing of the XML answers of the switch
//! - [`backup`] - Inventory, artifact storage and multi-switch runs
//! - [`error::SwitchError`] - Error types for all of the above
//! - [`config`] - Wire-level constants of the management interface

pub mod backup;
pub mod config;
pub mod device;
pub mod error;
pub mod session;
