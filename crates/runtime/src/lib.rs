pub mod bootstrap;
pub mod config;
pub mod controls;
pub mod event_bus;
pub mod headless;
pub mod surface;
pub mod sync;

pub use bootstrap::*;
pub use config::*;
pub use controls::*;
pub use event_bus::*;
pub use surface::*;
pub use sync::*;
