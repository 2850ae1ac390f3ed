//! Core data types for radio-bridge
//!
//! This module contains the small value types shared by the graph builder,
//! the session controller and the front ends.
//!
//! # Main Types
//!
//! - [`ComponentKind`] - The fourteen backend component types and their wire names
//! - [`Role`] - How a component is wired into the chain (source, processor, sink)
//! - [`DisplayType`] - Plot style requested from a display sink
//! - [`Readiness`] - Result of probing the backend pipes on disk
//! - [`SessionFlags`] - Running state plus the sticky transmit/receive flags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wiring role of a component in the linear chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Starts a chain; must not have an input
    Source,
    /// Has one input and one output
    Processor,
    /// Closes a chain; must have an input
    Sink,
}

/// Component types understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    // Sources
    /// SDR hardware receiver
    RadioSource,
    /// Outbound payload messages read from the transmit pipe
    MessageSource,

    // Sinks
    /// SDR hardware transmitter
    RadioSink,
    /// Spectrum or waterfall plot
    DisplaySink,
    /// Inbound payload messages written to the receive pipe
    MessageSink,

    // Processors
    SimpleFramer,
    SimpleDeframer,
    ManchesterEncoder,
    ManchesterDecoder,
    OokModulator,
    OokDemodulator,
    BitRateSampler,
    LowPassFilter,
    BandPassFilter,
}

impl ComponentKind {
    /// Every component type, sources first
    pub fn all() -> &'static [ComponentKind] {
        &[
            ComponentKind::RadioSource,
            ComponentKind::MessageSource,
            ComponentKind::RadioSink,
            ComponentKind::DisplaySink,
            ComponentKind::MessageSink,
            ComponentKind::SimpleFramer,
            ComponentKind::SimpleDeframer,
            ComponentKind::ManchesterEncoder,
            ComponentKind::ManchesterDecoder,
            ComponentKind::OokModulator,
            ComponentKind::OokDemodulator,
            ComponentKind::BitRateSampler,
            ComponentKind::LowPassFilter,
            ComponentKind::BandPassFilter,
        ]
    }

    /// Type token used in `CREATE` directives
    pub fn wire_name(&self) -> &'static str {
        match self {
            ComponentKind::RadioSource => "RADIO-SOURCE",
            ComponentKind::MessageSource => "MESSAGE-SOURCE",
            ComponentKind::RadioSink => "RADIO-SINK",
            ComponentKind::DisplaySink => "DISPLAY-SINK",
            ComponentKind::MessageSink => "MESSAGE-SINK",
            ComponentKind::SimpleFramer => "SIMPLE-FRAMER",
            ComponentKind::SimpleDeframer => "SIMPLE-DEFRAMER",
            ComponentKind::ManchesterEncoder => "MANCHESTER-ENCODER",
            ComponentKind::ManchesterDecoder => "MANCHESTER-DECODER",
            ComponentKind::OokModulator => "OOK-MODULATOR",
            ComponentKind::OokDemodulator => "OOK-DEMODULATOR",
            ComponentKind::BitRateSampler => "BIT-RATE-SAMPLER",
            ComponentKind::LowPassFilter => "LOW-PASS-FILTER",
            ComponentKind::BandPassFilter => "BAND-PASS-FILTER",
        }
    }

    /// Look up a component type by wire name, ignoring case
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.wire_name().eq_ignore_ascii_case(name))
    }

    /// Wiring role of this component type
    pub fn role(&self) -> Role {
        match self {
            ComponentKind::RadioSource | ComponentKind::MessageSource => Role::Source,
            ComponentKind::RadioSink | ComponentKind::DisplaySink | ComponentKind::MessageSink => {
                Role::Sink
            }
            _ => Role::Processor,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_name(s).ok_or_else(|| format!("unknown component type '{}'", s))
    }
}

/// Plot style of a display sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayType {
    #[default]
    Spectrum,
    Waterfall,
}

impl DisplayType {
    /// Upper-cased token sent to the backend
    pub fn wire_name(&self) -> &'static str {
        match self {
            DisplayType::Spectrum => "SPECTRUM",
            DisplayType::Waterfall => "WATERFALL",
        }
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for DisplayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spectrum" => Ok(DisplayType::Spectrum),
            "waterfall" => Ok(DisplayType::Waterfall),
            _ => Err(format!("unknown display type '{}'", s)),
        }
    }
}

/// Backend readiness derived from the presence of the pipe files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    NoCommandPipe,
    NoTransmitPipe,
    NoReceivePipe,
    Ready,
}

impl Readiness {
    /// Numeric status code (0 = not ready, 2 = ready)
    pub fn status_code(&self) -> u8 {
        match self {
            Readiness::Ready => 2,
            _ => 0,
        }
    }

    /// Human readable status line
    pub fn message(&self) -> &'static str {
        match self {
            Readiness::NoCommandPipe => "No command pipe found",
            Readiness::NoTransmitPipe => "No transmit pipe found",
            Readiness::NoReceivePipe => "No receive pipe found",
            Readiness::Ready => "Ready",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Running state and the sticky channel flags
///
/// `tx_enabled` / `rx_enabled` are set when a message source / sink is
/// created, survive stop and start, and are cleared only by reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionFlags {
    pub running: bool,
    pub tx_enabled: bool,
    pub rx_enabled: bool,
}
