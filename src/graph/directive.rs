//! Command-pipe directive vocabulary.
//!
//! Each [`Directive`] renders to exactly one line of the command protocol
//! (without the trailing newline, which the channel appends).

use crate::types::ComponentKind;
use std::fmt;

/// One control directive for the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Tear down the backend flowgraph
    Reset,
    /// Start processing
    Start,
    /// Stop processing
    Stop,
    /// Instantiate a component
    Create {
        kind: ComponentKind,
        name: String,
        params: Vec<String>,
    },
    /// Connect an output port to an input port
    Connect {
        source: String,
        source_port: u32,
        dest: String,
        dest_port: u32,
    },
}

impl Directive {
    /// Single-port connection used by the linear chain builder
    pub fn connect(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Directive::Connect {
            source: source.into(),
            source_port: 0,
            dest: dest.into(),
            dest_port: 0,
        }
    }

    /// Short label for logging
    pub fn verb(&self) -> &'static str {
        match self {
            Directive::Reset => "RESET",
            Directive::Start => "START",
            Directive::Stop => "STOP",
            Directive::Create { .. } => "CREATE",
            Directive::Connect { .. } => "CONNECT",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Reset | Directive::Start | Directive::Stop => f.write_str(self.verb()),
            Directive::Create { kind, name, params } => {
                write!(f, "CREATE {} {}", kind.wire_name(), name)?;
                for param in params {
                    write!(f, " {}", param)?;
                }
                Ok(())
            }
            Directive::Connect {
                source,
                source_port,
                dest,
                dest_port,
            } => write!(
                f,
                "CONNECT {} {} {} {}",
                source, source_port, dest, dest_port
            ),
        }
    }
}

/// Destination for emitted directives
///
/// Implemented by the command channel for real pipes, and by `Vec<Directive>`
/// so the graph builder can be driven without any I/O.
pub trait DirectiveSink {
    fn send(&mut self, directive: Directive) -> crate::error::Result<()>;
}

impl DirectiveSink for Vec<Directive> {
    fn send(&mut self, directive: Directive) -> crate::error::Result<()> {
        self.push(directive);
        Ok(())
    }
}
