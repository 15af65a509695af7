pub mod commands;
pub mod settings;
pub mod timing;
pub mod toolchain;
