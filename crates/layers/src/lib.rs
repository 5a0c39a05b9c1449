pub mod layer;
pub mod raster;
pub mod symbology;
pub mod tiles;

pub use layer::*;
pub use raster::*;
pub use symbology::*;
pub use tiles::*;
