//! Startup and diagnostic sequences run before (or instead of) the main loop.

pub mod post;
pub mod walk;

pub use post::run_post;
pub use walk::walk_leds;
