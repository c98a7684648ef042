//! Farm run loop with runtime controls.
//!
//! [`run_farm`] drives the tick processor against a host until one of:
//!
//! - **Tick limit**: `max_ticks` ticks have run
//! - **Operator stop**: [`TaskControl::request_stop`] was called
//! - **Abort**: the task stopped itself (pathing failure, full inventory)
//! - **Inactive**: something else deactivated the task
//!
//! Each tick's directive goes to the host's [`Pathfinder`], whose status
//! feeds the next tick. On abort with `go_home` set, the player is sent to
//! the home waypoint once.

use std::sync::Arc;

use harvest_types::{Directive, FarmRunId, Goal, Position, WaypointTag};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::host::{FarmHost, Pathfinder};
use crate::operator::TaskControl;
use crate::task::{AbortReason, FarmTaskState};
use crate::tick::{FarmTickProcessor, TickOutput};

/// Errors that can occur when running the farm loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The loop was started with an inactive task.
    #[error("farm task was not started")]
    NotStarted,
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FarmEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// A stop was requested through [`TaskControl`].
    OperatorStop,
    /// The task stopped itself.
    Aborted(AbortReason),
    /// The task became inactive without aborting.
    TaskInactive,
}

/// Result of a farm run.
#[derive(Debug, Clone)]
pub struct FarmRunResult {
    /// The reason the run ended.
    pub end_reason: FarmEndReason,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// The last tick's output, if any tick ran.
    pub final_output: Option<TickOutput>,
    /// The run that ended.
    pub run_id: Option<FarmRunId>,
    /// Home position the player was sent to after an abort.
    pub sent_home_to: Option<Position>,
}

/// Callback invoked after each tick.
pub trait TickCallback: Send {
    /// Called with the 1-based tick number, its output, and the task state.
    fn on_tick(&mut self, tick: u64, output: &TickOutput, state: &FarmTaskState);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _tick: u64, _output: &TickOutput, _state: &FarmTaskState) {}
}

/// Send the player to the home waypoint, if one is recorded.
pub fn return_home<H: FarmHost + Pathfinder>(host: &mut H) -> Option<Position> {
    let Some(home) = host.most_recent_by_tag(WaypointTag::Home) else {
        host.emit("No home waypoint set");
        warn!("Return home requested without a home waypoint");
        return None;
    };
    info!(%home, "Returning home");
    let _status = host.submit(&Directive::SetGoalAndPath(Goal::StandOn(home)));
    Some(home)
}

/// Run the farm loop until a termination condition is met.
///
/// The task must already be started with [`FarmTickProcessor::start`].
///
/// # Errors
///
/// Returns [`RunnerError::NotStarted`] if `state` is inactive.
pub async fn run_farm<H: FarmHost + Pathfinder>(
    processor: &FarmTickProcessor,
    state: &mut FarmTaskState,
    host: &mut H,
    control: &Arc<TaskControl>,
    go_home: bool,
    callback: &mut dyn TickCallback,
) -> Result<FarmRunResult, RunnerError> {
    if !state.is_active() {
        return Err(RunnerError::NotStarted);
    }

    let run_id = state.run_id();
    let mut status = host.status();
    let mut total_ticks: u64 = 0;
    let mut final_output: Option<TickOutput> = None;

    info!(
        run_id = ?run_id,
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        "Farm run starting"
    );

    let (end_reason, sent_home_to) = loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!("Operator stop requested");
            processor.stop(state);
            break (FarmEndReason::OperatorStop, None);
        }

        // --- Execute tick ---
        let output = processor.tick(state, &status, host);
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(total_ticks, &output, state);
        status = host.submit(&output.directive);
        let abort = output.abort();
        final_output = Some(output);

        // --- Check abort ---
        if let Some(reason) = abort {
            let home = if go_home { return_home(host) } else { None };
            break (FarmEndReason::Aborted(reason), home);
        }

        if !state.is_active() {
            break (FarmEndReason::TaskInactive, None);
        }

        // --- Check tick limit (after tick) ---
        if control.tick_limit_reached(total_ticks) {
            info!(ticks = total_ticks, "Tick limit reached");
            processor.stop(state);
            break (FarmEndReason::MaxTicksReached, None);
        }

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    };

    Ok(FarmRunResult {
        end_reason,
        total_ticks,
        final_output,
        run_id,
        sent_home_to,
    })
}

/// Log the end of a run.
pub fn log_run_end(result: &FarmRunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        run_id = ?result.run_id,
        final_action = ?result.final_output.as_ref().map(|o| o.action),
        sent_home_to = ?result.sent_home_to,
        "Farm run ended"
    );
    if result.total_ticks == 0 {
        warn!("Farm run ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use harvest_types::Position;

    use super::*;
    use crate::host::WaypointStore;
    use crate::sandbox::{SandboxHost, farmland_field};

    fn host() -> SandboxHost {
        let mut host = SandboxHost::new(farmland_field(3), Position::new(0, 65, 0), 1);
        host.set_growth_chance(0);
        host
    }

    #[test]
    fn return_home_without_waypoint_reports() {
        let mut host = host();
        assert_eq!(return_home(&mut host), None);
        assert_eq!(host.diagnostics().count_of("No home waypoint set"), 1);
        assert_eq!(host.feet(), Position::new(0, 65, 0));
    }

    #[test]
    fn return_home_heads_for_latest_home() {
        let mut host = host();
        host.add(WaypointTag::Home, Position::new(-3, 65, 0));
        host.add(WaypointTag::Home, Position::new(0, 65, 3));
        assert_eq!(return_home(&mut host), Some(Position::new(0, 65, 3)));
        assert_eq!(host.feet(), Position::new(0, 65, 1));
        assert!(host.diagnostics().is_empty());
    }

    #[test]
    fn end_reason_serializes() {
        let json =
            serde_json::to_string(&FarmEndReason::Aborted(AbortReason::StashFull)).unwrap();
        assert_eq!(json, r#"{"Aborted":"StashFull"}"#);
        let back: FarmEndReason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FarmEndReason::Aborted(AbortReason::StashFull));
    }
}
