// Core data models for envcal
// Records as they arrive, and the entities built from them

pub mod task;
pub mod status;
pub mod environment;
pub mod range;

pub use task::*;
pub use status::*;
pub use environment::*;
pub use range::*;
