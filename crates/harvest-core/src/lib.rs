//! Tick processor, deposit cycle, scan scheduling, and run loop for the
//! Harvest farming task.
//!
//! Each tick the [`FarmTickProcessor`] turns the explicit [`FarmTaskState`],
//! the last [`PathingStatus`], and live host queries into one
//! [`Directive`](harvest_types::Directive). World scans run in the
//! background through a [`SnapshotSource`]; the tick never waits for them.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `harvest-config.yaml` into
//!   strongly-typed structs.
//! - [`deposit`] -- The stash deposit state machine and stash selection.
//! - [`host`] -- The host interfaces the core drives, bundled as [`FarmHost`].
//! - [`operator`] -- [`TaskControl`], runtime stop and tick-speed control.
//! - [`runner`] -- The async run loop and its end reasons.
//! - [`sandbox`] -- [`SandboxHost`], an in-memory host with a demo farm.
//! - [`scan`] -- [`ScanScheduler`] and the snapshot source seam.
//! - [`task`] -- [`FarmTaskState`] and abort reasons.
//! - [`tick`] -- The per-tick decision.

pub mod config;
pub mod deposit;
pub mod host;
pub mod operator;
pub mod runner;
pub mod sandbox;
pub mod scan;
pub mod task;
pub mod tick;

// Re-export primary types at crate root.
pub use config::{ConfigError, HarvestConfig};
pub use deposit::{DepositMachine, DepositOutcome, DepositState, StashSelection, select_stash};
pub use host::{FarmHost, PathingStatus, Pathfinder};
pub use operator::TaskControl;
pub use runner::{FarmEndReason, FarmRunResult, NoOpCallback, RunnerError, TickCallback, run_farm};
pub use sandbox::{SandboxHost, SandboxScanner};
pub use scan::{BlockScanner, ScanError, ScanRequest, ScanScheduler, SnapshotSource, StaticSnapshotSource};
pub use task::{AbortReason, FarmTaskState};
pub use tick::{FarmSettings, FarmTickProcessor, TickAction, TickOutput};
