//! Galley interaction kernel: deterministic, tick-driven coordination of
//! agents, stations, and items in a shared kitchen.
//!
//! The hard problem the kernel solves is interaction resolution under
//! ambiguity and concurrent mutation: per tick each agent may be near several
//! candidate targets, may be carrying an item, and may be mid-gesture while
//! another agent mutates the same station. The kernel deterministically picks
//! one target per agent, disambiguates tap from hold on a single input
//! channel, and keeps every agent's cached candidate view consistent across
//! item identity changes.

pub mod agent;
pub mod geometry;
pub mod gesture;
pub mod interactable;
pub mod item;
pub mod process;
pub mod recipes;
pub mod station;
pub mod world;

pub use world::KitchenWorld;
