//! Export du rapport

pub mod pdf;
