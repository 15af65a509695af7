pub mod model;
pub mod generator;
pub mod emitter;
pub mod recovered;
pub mod fingerprint;
pub mod error;
