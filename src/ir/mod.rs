pub mod convolver;
pub mod loader;
pub mod model;

pub use convolver::convolve_same;
pub use loader::{IrLibrary, IrLoader};
pub use model::{ImpulseResponse, IrSet};
