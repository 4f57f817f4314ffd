//! Command dispatch policy for automation consumers
//!
//! Physical actuators differ in how reliably they report state back. For a
//! device with trustworthy reporting, re-sending a command the device is
//! already in wastes a remote write; for one with unreliable reporting
//! (a lamp relay that never confirms), suppressing would leave the device
//! stuck. The policy is therefore a per-call choice, not a global mode.

use crate::client::OpenHabClient;
use crate::error::Result;
use serde::Serialize;
use tracing::{debug, warn};

/// openHAB state strings that mean "no usable reported state"
const UNKNOWN_STATES: &[&str] = &["NULL", "UNDEF"];

/// Per-call dispatch policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPolicy {
    /// Issue the command only when the reported state differs from the
    /// desired command, or is unknown
    SendIfDifferent,
    /// Issue the command unconditionally
    AlwaysSend,
}

/// Outcome of the pure decision function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Send,
    Suppress,
}

/// Decide whether to issue a command. Pure: no hidden state beyond the
/// arguments.
pub fn decide(reported: Option<&str>, desired: &str, policy: CommandPolicy) -> Decision {
    match policy {
        CommandPolicy::AlwaysSend => Decision::Send,
        CommandPolicy::SendIfDifferent => match reported {
            None => Decision::Send,
            Some(state) if UNKNOWN_STATES.contains(&state) => Decision::Send,
            Some(state) if state == desired => Decision::Suppress,
            Some(_) => Decision::Send,
        },
    }
}

/// Outcome of a dispatched command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The command was issued to the remote system
    Sent,
    /// The reported state already matched; no write was issued
    Suppressed,
    /// The target item did not resolve; reported, not a crash
    TargetMissing,
}

/// Resolve the target item, apply the policy against its reported state,
/// and honor the decision by writing through the client only on `Send`.
///
/// A missing target is a reported condition: automation consumers keep
/// running their remaining commands rather than failing the whole rule.
pub async fn dispatch_command(
    client: &dyn OpenHabClient,
    item_name: &str,
    command: &str,
    policy: CommandPolicy,
) -> Result<DispatchOutcome> {
    let item = match client.get_item(item_name).await {
        Ok(item) => item,
        Err(e) if e.is_not_found() => {
            warn!("Dispatch target '{item_name}' does not resolve; skipping command");
            return Ok(DispatchOutcome::TargetMissing);
        }
        Err(e) => return Err(e),
    };

    match decide(item.state.as_deref(), command, policy) {
        Decision::Send => {
            client.update_item_state(item_name, command).await?;
            debug!("Sent '{command}' to '{item_name}'");
            Ok(DispatchOutcome::Sent)
        }
        Decision::Suppress => {
            debug!("Suppressed redundant '{command}' to '{item_name}'");
            Ok(DispatchOutcome::Suppressed)
        }
    }
}
