// ABOUTME: API module containing all HTTP handler functions for the kvwatch surface.
// ABOUTME: Organized into sub-modules for per-key get/set and the change feed.

pub mod changes;
pub mod kv;
