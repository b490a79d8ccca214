//! Client control protocol
//!
//! Requests (`get`, `set`, `setup`) arrive as JSON text frames and are answered
//! with a response echoing the request kind and id. Finalized results are
//! pushed to the client as unsolicited `set` requests.

mod handler;
mod messages;

pub use handler::ControlHandler;
pub use messages::{
    ClientMessage, ClientResponse, GetParam, RawRequest, Request, ResponseParams, ResultsPush,
    SetParam, SetRequest, Response,
};
