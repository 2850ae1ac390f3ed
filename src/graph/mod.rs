//! Component graph builder
//!
//! Turns a sequence of "create component" calls into an explicit linear
//! pipeline on the backend. The builder keeps:
//!
//! - a registry of every component name created this session, and
//! - a single wiring cursor naming the component whose output is still
//!   unconnected (the "dangling output").
//!
//! # Wiring rules
//!
//! | Role      | Cursor must be | Emits                         | Cursor after |
//! |-----------|----------------|-------------------------------|--------------|
//! | Source    | empty          | nothing                       | this name    |
//! | Processor | set            | `CONNECT <cursor> 0 <name> 0` | this name    |
//! | Sink      | set            | `CONNECT <cursor> 0 <name> 0` | empty        |
//!
//! `CREATE` is always sent once the name passes the duplicate check, even if
//! the wiring step then fails. A wiring failure leaves the cursor untouched.
//! [`GraphBuilder::source_from`] redirects the cursor to any registered
//! component to start a branch.

mod component;
mod directive;
mod number;

pub use component::{Component, ParamContext};
pub use directive::{Directive, DirectiveSink};
pub use number::format_number;

use crate::error::Result;
use crate::session::Fault;
use crate::types::Role;
use std::collections::HashSet;

/// Registry and wiring cursor for one session
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    registry: HashSet<String>,
    cursor: Option<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Component with the currently dangling output, if any
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Forget every component and the cursor
    pub fn clear(&mut self) {
        self.registry.clear();
        self.cursor = None;
    }

    /// Claim a name for a new component.
    pub fn register(&mut self, name: &str) -> std::result::Result<(), Fault> {
        if self.registry.insert(name.to_string()) {
            Ok(())
        } else {
            Err(Fault::DuplicateName(name.to_string()))
        }
    }

    /// Send `CREATE` for an already registered name and wire it into the chain.
    ///
    /// Returns the wiring fault, if any. Errors are only returned when the
    /// sink itself fails to accept a directive.
    pub fn build(
        &mut self,
        name: &str,
        component: &Component,
        ctx: ParamContext<'_>,
        sink: &mut dyn DirectiveSink,
    ) -> Result<Option<Fault>> {
        sink.send(Directive::Create {
            kind: component.kind(),
            name: name.to_string(),
            params: component.params(ctx),
        })?;
        self.wire(name, component.kind().role(), sink)
    }

    /// Register, create and wire a component in one step
    pub fn create(
        &mut self,
        name: &str,
        component: &Component,
        ctx: ParamContext<'_>,
        sink: &mut dyn DirectiveSink,
    ) -> Result<Option<Fault>> {
        if let Err(fault) = self.register(name) {
            return Ok(Some(fault));
        }
        self.build(name, component, ctx, sink)
    }

    fn wire(&mut self, name: &str, role: Role, sink: &mut dyn DirectiveSink) -> Result<Option<Fault>> {
        match (role, self.cursor.take()) {
            (Role::Source, None) => {
                self.cursor = Some(name.to_string());
                Ok(None)
            }
            (Role::Source, Some(dangling)) => {
                self.cursor = Some(dangling);
                Ok(Some(Fault::SourceHasInput(name.to_string())))
            }
            (Role::Sink, None) => Ok(Some(Fault::SinkWithoutInput(name.to_string()))),
            (Role::Processor, None) => Ok(Some(Fault::ProcessorWithoutInput(name.to_string()))),
            (role, Some(dangling)) => {
                let connect = Directive::connect(dangling.as_str(), name);
                if let Err(e) = sink.send(connect) {
                    self.cursor = Some(dangling);
                    return Err(e);
                }
                if role == Role::Processor {
                    self.cursor = Some(name.to_string());
                }
                Ok(None)
            }
        }
    }

    /// Reuse an existing component as the producer for the next component.
    pub fn source_from(&mut self, producer: &str) -> std::result::Result<(), Fault> {
        if !self.contains(producer) {
            return Err(Fault::ComponentNotFound(producer.to_string()));
        }
        self.cursor = Some(producer.to_string());
        Ok(())
    }
}
