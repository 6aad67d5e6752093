//! Route authorization for the CIVICA portal.
//!
//! The gate decides which routes are reachable given the current
//! session. Reachability is expressed purely by which route tree is
//! mounted: unauthenticated sessions see the public tree (login,
//! registration, recovery, credit titles), authenticated sessions see
//! the user tree, and the admin routes exist only for admin sessions.
//! Everything else resolves to NotFound.

mod gate;

pub use gate::{AuthGate, GateState, RouteOutcome, RouteView};
