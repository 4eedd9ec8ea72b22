//! Offline cache subsystem: request identity, versioned stores, the
//! precache/sweep lifecycle, and the fetch interception policy.
//!
//! The browser's Cache API and `fetch` are external services here; shells
//! implement [`store::CacheStorage`] and [`request::NetworkFetcher`] on top
//! of the real primitives, and the policy in [`interceptor`] stays testable
//! against the in-memory implementations.

pub mod interceptor;
pub mod lifecycle;
pub mod request;
pub mod store;

pub use interceptor::{
    BypassReason, FetchInterceptor, FetchOutcome, RouteDecision, ServedFrom, StatsSnapshot,
};
pub use lifecycle::{
    ActivateError, ActivateReport, CacheLifecycle, ClaimError, ClientControl, InstallError,
    InstallReport, NoClients,
};
pub use request::{
    FetchError, Method, NetworkFetcher, RequestDescriptor, RequestError, RequestKey, ResponseKind,
    ResponseSnapshot,
};
pub use store::{CacheName, CacheStorage, CacheVersion, MemoryCacheStorage, StoreError};
