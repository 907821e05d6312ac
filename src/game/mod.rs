pub mod authority;
pub mod autopilot;
pub mod camera;
pub mod constants;
pub mod effects;
pub mod food;
pub mod lifecycle;
pub mod math;
pub mod membership;
pub mod physics;
pub mod session;
pub mod snake;
pub mod timers;
pub mod types;
pub mod world;
