//! Drive access workspace crate.
//!
//! Re-exports the workspace crates so a host application can depend on
//! `drive-access-workspace` alone. The `google-drive` feature (default) adds
//! the desktop HTTP bridge and the Google Drive binding.

pub use bridge_traits;
pub use core_drive;
pub use core_runtime;

#[cfg(feature = "google-drive")]
pub use bridge_desktop;
#[cfg(feature = "google-drive")]
pub use provider_google_drive;

pub use core_drive::DriveFacade;
pub use core_runtime::config::DriveConfig;
