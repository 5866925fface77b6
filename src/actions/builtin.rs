//! Built-in actions
//!
//! Every action here is auto-loaded into the default detector under its
//! registration name.

use std::collections::HashSet;

use anyhow::bail;
use parking_lot::Mutex;
use tracing::{info, warn};

use super::{Action, ActionAttribute, ActionContext, ActionType};

/// Log the condition at warning level
#[derive(Debug, Default)]
pub struct LogAction;

impl Action for LogAction {
    fn invoke(&self, ctx: &ActionContext) -> anyhow::Result<()> {
        warn!(
            "Intrusion threshold reached: {} ({} events, principal: {})",
            ctx.event,
            ctx.count,
            ctx.principal.as_deref().unwrap_or("-")
        );
        Ok(())
    }
}

impl ActionType for LogAction {
    const TYPE_ID: &'static str = "ids_loader::actions::LogAction";
    const REGISTRATION: Option<ActionAttribute> = Some(ActionAttribute::auto_load("log"));

    fn create() -> Result<Self, String> {
        Ok(Self)
    }
}

/// Block the offending principal
#[derive(Debug, Default)]
pub struct BlockAction {
    blocked: Mutex<HashSet<String>>,
}

impl BlockAction {
    pub fn is_blocked(&self, principal: &str) -> bool {
        self.blocked.lock().contains(principal)
    }
}

impl Action for BlockAction {
    fn invoke(&self, ctx: &ActionContext) -> anyhow::Result<()> {
        let Some(principal) = ctx.principal.as_deref() else {
            bail!("block requested for {} without a principal", ctx.event);
        };

        if self.blocked.lock().insert(principal.to_string()) {
            info!("BLOCK: {} after {} x {}", principal, ctx.count, ctx.event);
        }
        Ok(())
    }
}

impl ActionType for BlockAction {
    const TYPE_ID: &'static str = "ids_loader::actions::BlockAction";
    const REGISTRATION: Option<ActionAttribute> = Some(ActionAttribute::auto_load("block"));

    fn create() -> Result<Self, String> {
        Ok(Self::default())
    }
}

/// Lock the offending account
#[derive(Debug, Default)]
pub struct LockAction {
    locked: Mutex<HashSet<String>>,
}

impl LockAction {
    pub fn is_locked(&self, account: &str) -> bool {
        self.locked.lock().contains(account)
    }
}

impl Action for LockAction {
    fn invoke(&self, ctx: &ActionContext) -> anyhow::Result<()> {
        let Some(account) = ctx.principal.as_deref() else {
            bail!("lock requested for {} without an account", ctx.event);
        };

        if self.locked.lock().insert(account.to_string()) {
            info!("LOCK: account {} ({})", account, ctx.event);
        }
        Ok(())
    }
}

impl ActionType for LockAction {
    const TYPE_ID: &'static str = "ids_loader::actions::LockAction";
    const REGISTRATION: Option<ActionAttribute> = Some(ActionAttribute::auto_load("lock"));

    fn create() -> Result<Self, String> {
        Ok(Self::default())
    }
}

/// Terminate the offending session
#[derive(Debug, Default)]
pub struct LogoutAction {
    terminated: Mutex<u64>,
}

impl LogoutAction {
    /// Sessions terminated so far
    pub fn terminated(&self) -> u64 {
        *self.terminated.lock()
    }
}

impl Action for LogoutAction {
    fn invoke(&self, ctx: &ActionContext) -> anyhow::Result<()> {
        *self.terminated.lock() += 1;
        info!(
            "LOGOUT: {} ({})",
            ctx.principal.as_deref().unwrap_or("current session"),
            ctx.event
        );
        Ok(())
    }
}

impl ActionType for LogoutAction {
    const TYPE_ID: &'static str = "ids_loader::actions::LogoutAction";
    const REGISTRATION: Option<ActionAttribute> = Some(ActionAttribute::auto_load("logout"));

    fn create() -> Result<Self, String> {
        Ok(Self::default())
    }
}
