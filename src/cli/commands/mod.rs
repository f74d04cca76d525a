pub mod config;
pub mod generate;

pub use generate::GenerateOptions;
