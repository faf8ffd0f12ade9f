//! Read entities definitions.

pub mod estate;
