/// Run clock and lifecycle phases.
pub mod clock;
pub mod controller;
pub mod engine;
/// Single-loop PID controller.
pub mod pid;
/// Airtight room mass and energy balance.
pub mod room;
pub mod summary;
pub mod types;
