mod region;
mod merge;
mod quadrant;
mod mass;
mod force;
mod frame;

pub use region::*;
pub use merge::*;
pub use quadrant::*;
pub use force::*;
pub use frame::*;

#[cfg(test)]
mod quadrant_tests;
#[cfg(test)]
mod frame_tests;
