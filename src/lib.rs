#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared client core for the Gather community platform.
//!
//! Two collaborating subsystems, both sans-IO so shells can drive them from
//! any event loop:
//!
//! - [`cache`]: the offline cache layer — versioned cache generations, the
//!   precache installer, the generation sweeper, and the fetch interceptor
//!   that routes requests between cache and network.
//! - [`gesture`]: the touch-gesture layer — per-session long-press and
//!   swipe-to-reply detection with mutual exclusion between the two.
//!
//! Browser primitives (cache storage, fetch, one-shot timers, vibration,
//! client control) stay on the shell side, behind the traits in [`cache`]
//! and the commands emitted by [`gesture::GestureArbiter`].

pub mod cache;
pub mod config;
pub mod gesture;

/// Hold duration before a stationary touch becomes a long-press.
pub const LONG_PRESS_HOLD_MS: u64 = 500;
/// Movement on either axis beyond this disqualifies a long-press.
pub const LONG_PRESS_SLOP_PX: f64 = 10.0;
/// Vertical travel beyond this reclassifies a swipe as a scroll.
pub const SWIPE_VERTICAL_CANCEL_PX: f64 = 30.0;
/// Ceiling for the published reply-reveal offset.
pub const SWIPE_MAX_OFFSET_PX: f64 = 120.0;
/// Offset a swipe must exceed at release to commit a reply.
pub const SWIPE_COMMIT_PX: f64 = 60.0;
/// Duration of the confirmation haptic pulse.
pub const HAPTIC_PULSE_MS: u64 = 50;

pub use cache::interceptor::{
    BypassReason, FetchInterceptor, FetchOutcome, RouteDecision, ServedFrom, StatsSnapshot,
};
pub use cache::lifecycle::{
    ActivateError, ActivateReport, CacheLifecycle, ClaimError, ClientControl, InstallError,
    InstallReport, NoClients,
};
pub use cache::request::{
    FetchError, Method, NetworkFetcher, RequestDescriptor, RequestError, RequestKey, ResponseKind,
    ResponseSnapshot,
};
pub use cache::store::{CacheName, CacheStorage, CacheVersion, MemoryCacheStorage, StoreError};
pub use config::{ConfigError, CoreConfig};
pub use gesture::arbiter::GestureArbiter;
pub use gesture::{
    GestureCommand, GestureConfig, GestureError, SubjectId, SurfaceKind, TimerToken, TouchPoint,
};
