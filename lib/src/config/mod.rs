//! Configuration module.
//!
//! Skirt/brim settings are passed explicitly into every generation call
//! rather than read from ambient global state.

mod skirt_brim_config;

pub use skirt_brim_config::{
    ExtruderSettings, ShieldSettings, SkirtBrimConfig, HOLE_REMOVAL_MULTIPLIER, MAX_RING_COUNT,
};
