//! `ModuleCoordinator`: the boundary over whatever external process
//! manager actually starts and stops watcher processes.
//!
//! Grounded on `aw_core/util.py`'s `list_modules`/`start_module`/
//! `stop_module`/`start_all_module`/`stop_all_module`, which in turn
//! call through to `aw_qt.manager.Manager` — that manager is the
//! out-of-scope external process manager named in spec.md §1; this
//! trait is only the seam `EncryptedStore.init_db` calls into on
//! schema or identity change (spec.md §4.5 step 6).

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub name: String,
    pub running: bool,
}

pub trait ModuleCoordinator: Send + Sync {
    fn status(&self) -> Result<Vec<ModuleStatus>>;
    fn start(&self, name: &str) -> Result<()>;
    fn stop(&self, name: &str) -> Result<()>;

    /// Stops every module currently running, per `stop_all_module`'s
    /// skip-the-server-itself convention — `server_module_name` names
    /// the module that must never be stopped by this sweep.
    fn stop_all(&self, server_module_name: &str) -> Result<()> {
        for module in self.status()? {
            if module.running && module.name != server_module_name {
                self.stop(&module.name)?;
            }
        }
        Ok(())
    }

    /// Starts every known module, per `start_all_module`'s same
    /// skip-the-server convention.
    fn start_all(&self, server_module_name: &str) -> Result<()> {
        for module in self.status()? {
            if module.name != server_module_name {
                self.start(&module.name)?;
            }
        }
        Ok(())
    }
}

/// No-op reference implementation: used by tests, and by any binary
/// that does not wire in a real process manager. Wiring to a real OS
/// process manager is out of scope.
#[derive(Default)]
pub struct NullModuleCoordinator;

impl NullModuleCoordinator {
    pub fn new() -> Self {
        NullModuleCoordinator
    }
}

impl ModuleCoordinator for NullModuleCoordinator {
    fn status(&self) -> Result<Vec<ModuleStatus>> {
        Ok(Vec::new())
    }

    fn start(&self, name: &str) -> Result<()> {
        log::debug!("NullModuleCoordinator: start({name}) is a no-op");
        Ok(())
    }

    fn stop(&self, name: &str) -> Result<()> {
        log::debug!("NullModuleCoordinator: stop({name}) is a no-op");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_coordinator_reports_no_modules() {
        let coordinator = NullModuleCoordinator::new();
        assert!(coordinator.status().unwrap().is_empty());
    }

    #[test]
    fn null_coordinator_start_stop_all_are_no_ops() {
        let coordinator = NullModuleCoordinator::new();
        coordinator.start_all("aw-server").unwrap();
        coordinator.stop_all("aw-server").unwrap();
    }
}
