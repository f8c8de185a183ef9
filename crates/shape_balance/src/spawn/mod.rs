//! Seeding and driving a balanced population: configuration, initial
//! distribution, the spawner that routes strikes, and tooltip text.
pub mod config;
pub mod distributor;
pub mod selection;
pub mod spawner;
pub mod tooltip;
