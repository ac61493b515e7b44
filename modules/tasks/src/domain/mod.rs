pub mod error;
pub mod normalize;
pub mod service;
pub mod validation;
