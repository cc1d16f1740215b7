//! Router Module Index
//!
//! Splits the routing table by access rule: public routes carry no gate, protected
//! routes sit behind the endpoint-token layer applied in `create_router`.

/// Health and liveness routes. No token required.
pub mod public;

/// Every `/v1/workwise/*` route. Each one requires its own `X-Endpoint-Token`.
pub mod protected;
