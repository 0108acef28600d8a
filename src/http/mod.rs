//! Minimal HTTP/1.1 plumbing for the proxy surfaces.
//!
//! Both the public listener and the admin listener speak plain
//! HTTP/1.1 over TCP: requests are parsed with `httparse`, handed to a
//! [`Dispatch`] implementor, and the resulting [`Response`] is written
//! back. The same [`Request`] / [`Response`] types double as the wire
//! representation for upstream forwarding.

mod error;
mod request;
mod response;
mod server;

pub use error::{HttpError, HttpResult};
pub use request::{Request, RequestBuilder};
pub use response::{Response, ResponseBuilder};
pub use server::{Dispatch, HttpServer};
