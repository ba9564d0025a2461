//! Fides Responder — Background task that accepts inbound connection
//! offers on behalf of an identity agent.

pub mod error;
pub mod responder;

pub use error::ResponderError;
pub use responder::ConnectionResponder;
