//! Keydeck wire protocol
//!
//! JSON bodies exchanged with the remote switch service and served by the
//! status endpoint.
//!
//! # Remote switch API
//!
//! ```text
//! GET  {base}/api/states/{entity}          -> EntityState
//! POST {base}/api/services/switch/turn_on  <- ServiceCall
//! POST {base}/api/services/switch/turn_off <- ServiceCall
//! ```
//!
//! Requests carry `Authorization: Bearer {token}` and
//! `content-type: application/json`.
//!
//! # Status endpoint
//!
//! Every request is answered with a [`DeckStatus`] describing the attached
//! device.

#![deny(unsafe_code)]

pub mod ha;
pub mod monitor;

pub use ha::{service_path, state_path, EntityAttributes, EntityState, ServiceCall};
pub use monitor::DeckStatus;
