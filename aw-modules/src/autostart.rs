//! `AutostartAgent`: the abstract launch-at-login boundary from
//! spec.md §6.
//!
//! Grounded on `aw_core/launch_start.py`'s platform-specific pair
//! (`launch_app`/`delete_app`/`check_startup_status` on macOS via a
//! launch-agent property list, `create_shortcut`/`delete_shortcut` on
//! Windows via a Start-Menu shortcut) — both collapse to the same
//! three-operation interface here.

use crate::error::Result;

pub trait AutostartAgent: Send + Sync {
    fn enable(&self) -> Result<()>;
    fn disable(&self) -> Result<()>;
    fn is_enabled(&self) -> Result<bool>;
}

/// No-op reference implementation for tests and platforms without a
/// real autostart integration wired in.
#[derive(Default)]
pub struct NullAutostartAgent;

impl NullAutostartAgent {
    pub fn new() -> Self {
        NullAutostartAgent
    }
}

impl AutostartAgent for NullAutostartAgent {
    fn enable(&self) -> Result<()> {
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_agent_reports_disabled() {
        let agent = NullAutostartAgent::new();
        assert!(!agent.is_enabled().unwrap());
        agent.enable().unwrap();
        agent.disable().unwrap();
    }
}
