//! The two OS/process boundaries `EncryptedStore.init_db` calls
//! through, but never implements for real: starting and stopping
//! watcher modules, and launch-at-login policy.

mod autostart;
mod coordinator;
mod error;

pub use autostart::{AutostartAgent, NullAutostartAgent};
pub use coordinator::{ModuleCoordinator, ModuleStatus, NullModuleCoordinator};
pub use error::{ModuleError, Result};
