#![deny(warnings)]
mod auto;
mod strategy;

pub use auto::AutoStrategy;
pub use strategy::{PassView, PlayView, Strategy};
