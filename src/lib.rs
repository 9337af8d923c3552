//! SOME/IP payload decoding driven by data types derived from ARXML
//! configuration documents.
//!
//! [`matrix`] builds the type graph, [`resolver`] maps service/event ids to
//! a type, [`decoder`] turns payload bytes into a [`decoder::Value`].
//! [`converter::SomeipConverter`] ties the three together.

pub mod converter;
pub mod decoder;
pub mod errors;
pub mod matrix;
pub mod resolver;
pub mod types;

pub use converter::SomeipConverter;
pub use errors::MyError;
