//! Document Discovery
//!
//! Locates README-style documentation files across a repository checkout.

pub mod locator;

pub use locator::DocumentLocator;
