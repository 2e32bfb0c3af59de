//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the engine.
//! - `adapters`: OS/runtime specific implementations (IO/async).

pub mod adapters;
pub mod ports;
