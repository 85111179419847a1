//! Villager Trade Limiter settings library.
//!
//! Resolves trade settings (demand caps, discount caps, trading toggles) for a
//! specific villager trade, honouring per-item and per-enchantment overrides.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod item;
pub mod keys;
pub mod logging;
pub mod overrides;
pub mod recipe;
pub mod settings;
