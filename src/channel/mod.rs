//! Backend pipe channels
//!
//! - [`CommandChannel`] appends control directives to the command pipe
//! - [`TransmitChannel`] appends outbound payload lines while open
//! - [`ReceiveFramer`] reads and frames inbound payload lines non-blocking
//!
//! All three own their pipe handle exclusively and open it lazily.

mod command;
mod pipe;
mod receive;
mod transmit;

pub use command::CommandChannel;
pub use pipe::{open_path, probe_readiness, Pipe, PipeHandle, PipeMode};
pub use receive::{error_code, ByteSource, FramerStep, ReadOutcome, ReceiveFramer, RxBuffer};
pub use transmit::TransmitChannel;

#[cfg(test)]
pub use receive::MockByteSource;
