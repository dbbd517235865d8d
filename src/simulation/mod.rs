pub mod orbit;
pub mod universe;

pub use orbit::*;
pub use universe::*;
