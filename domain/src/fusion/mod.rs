//! Fan-out / aggregate domain.
//!
//! A [`QueryRequest`] is fanned out to every target model, producing one
//! [`FanOutResult`] per target in request order. The successful results are
//! then synthesized by an aggregator model, whose streamed output grows an
//! [`AggregateSession`]. The whole run is summarized by a [`FusionResult`].

pub mod request;
pub mod result;
pub mod session;

pub use request::QueryRequest;
pub use result::{ErrorInfo, ErrorKind, FanOutResult, FusionResult};
pub use session::{AggregateSession, AggregateState};
