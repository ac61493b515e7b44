//! REST helpers shared by feature modules.

pub mod envelope;
pub mod extract;
