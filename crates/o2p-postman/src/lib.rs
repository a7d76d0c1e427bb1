pub mod converter;
pub mod example;
pub mod folders;
pub mod request;

pub use converter::{PostmanConverter, convert_document};
