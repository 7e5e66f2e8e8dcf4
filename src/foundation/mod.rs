/// Frame geometry, frame rate, and switch-interval types.
pub mod core;
/// Error taxonomy shared by every stage.
pub mod error;
