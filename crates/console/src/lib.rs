//! LexHub Console Core
//!
//! The front-end-agnostic half of the search UI: one canonical search state
//! owned by a controller, a reducer that collapses no-op transitions, a
//! monotonic request token that makes overlapping searches last-request-wins,
//! and URL parameter sync for the public surface.
//!
//! Nothing here renders; a UI layer dispatches [`Action`]s, executes the
//! returned [`Effect`]s, and reads the state back.

mod controller;
mod state;
mod url;

pub use controller::{RequestToken, SearchBackend, SearchController};
pub use state::{Action, Effect, MarkerKey, SearchState, Transition};
pub use url::{criteria_from_query_params, criteria_to_query_params};
