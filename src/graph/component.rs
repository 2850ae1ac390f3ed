//! Component descriptions and their `CREATE` parameters.
//!
//! A [`Component`] carries the user-facing arguments of a create call
//! (frequencies in MHz, bandwidths in kHz). [`Component::params`] scales
//! them and folds in the session-wide signal constants and pipe paths to
//! produce the parameter list the backend expects.

use super::number::format_number;
use crate::config::{PipePaths, SignalConfig};
use crate::types::{ComponentKind, DisplayType};

/// A component to create, with its type-specific arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    RadioSource { frequency_mhz: f64, gain: f64 },
    RadioSink { frequency_mhz: f64, gain: f64 },
    DisplaySink { display: DisplayType, frequency_mhz: f64 },
    MessageSource,
    MessageSink,
    SimpleFramer,
    SimpleDeframer,
    ManchesterEncoder,
    ManchesterDecoder,
    OokModulator { frequency_khz: f64 },
    OokDemodulator,
    BitRateSampler,
    LowPassFilter { bandwidth_khz: f64 },
    BandPassFilter { low_cutoff_khz: f64, high_cutoff_khz: f64 },
}

/// Session-wide values folded into component parameters
#[derive(Debug, Clone, Copy)]
pub struct ParamContext<'a> {
    pub signal: &'a SignalConfig,
    pub pipes: &'a PipePaths,
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::RadioSource { .. } => ComponentKind::RadioSource,
            Component::RadioSink { .. } => ComponentKind::RadioSink,
            Component::DisplaySink { .. } => ComponentKind::DisplaySink,
            Component::MessageSource => ComponentKind::MessageSource,
            Component::MessageSink => ComponentKind::MessageSink,
            Component::SimpleFramer => ComponentKind::SimpleFramer,
            Component::SimpleDeframer => ComponentKind::SimpleDeframer,
            Component::ManchesterEncoder => ComponentKind::ManchesterEncoder,
            Component::ManchesterDecoder => ComponentKind::ManchesterDecoder,
            Component::OokModulator { .. } => ComponentKind::OokModulator,
            Component::OokDemodulator => ComponentKind::OokDemodulator,
            Component::BitRateSampler => ComponentKind::BitRateSampler,
            Component::LowPassFilter { .. } => ComponentKind::LowPassFilter,
            Component::BandPassFilter { .. } => ComponentKind::BandPassFilter,
        }
    }

    /// Parameters following the name in the `CREATE` directive
    pub fn params(&self, ctx: ParamContext<'_>) -> Vec<String> {
        let sample_rate = f64::from(ctx.signal.sample_rate);
        let symbol_rate = ctx.signal.symbol_rate();

        let values: Vec<f64> = match self {
            Component::RadioSource {
                frequency_mhz,
                gain,
            }
            | Component::RadioSink {
                frequency_mhz,
                gain,
            } => vec![frequency_mhz * 1e6, *gain],
            Component::DisplaySink {
                display,
                frequency_mhz,
            } => {
                return vec![
                    display.wire_name().to_string(),
                    format_number(frequency_mhz * 1e6),
                    format_number(sample_rate),
                ];
            }
            Component::MessageSource => {
                return vec![
                    ctx.pipes.transmit.display().to_string(),
                    format_number(ctx.signal.byte_rate()),
                ];
            }
            Component::MessageSink => return vec![ctx.pipes.receive.display().to_string()],
            Component::SimpleFramer
            | Component::SimpleDeframer
            | Component::ManchesterEncoder
            | Component::ManchesterDecoder => Vec::new(),
            Component::OokModulator { frequency_khz } => {
                vec![symbol_rate, sample_rate, (frequency_khz * 1000.0).floor()]
            }
            Component::OokDemodulator | Component::BitRateSampler => {
                vec![symbol_rate, sample_rate]
            }
            Component::LowPassFilter { bandwidth_khz } => {
                vec![sample_rate, 1000.0 * bandwidth_khz, 1.0]
            }
            Component::BandPassFilter {
                low_cutoff_khz,
                high_cutoff_khz,
            } => vec![
                sample_rate,
                1000.0 * low_cutoff_khz,
                1000.0 * high_cutoff_khz,
                1.0,
            ],
        };

        values.into_iter().map(format_number).collect()
    }

    /// Build a component from textual arguments (everything after the name)
    pub fn from_args(kind: ComponentKind, args: &[&str]) -> Result<Self, String> {
        let expected = match kind {
            ComponentKind::RadioSource
            | ComponentKind::RadioSink
            | ComponentKind::DisplaySink
            | ComponentKind::BandPassFilter => 2,
            ComponentKind::OokModulator | ComponentKind::LowPassFilter => 1,
            _ => 0,
        };
        if args.len() != expected {
            return Err(format!(
                "{} takes {} argument(s), got {}",
                kind,
                expected,
                args.len()
            ));
        }

        let num = |i: usize| -> Result<f64, String> {
            args[i]
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", args[i]))
        };

        Ok(match kind {
            ComponentKind::RadioSource => Component::RadioSource {
                frequency_mhz: num(0)?,
                gain: num(1)?,
            },
            ComponentKind::RadioSink => Component::RadioSink {
                frequency_mhz: num(0)?,
                gain: num(1)?,
            },
            ComponentKind::DisplaySink => Component::DisplaySink {
                display: args[0].parse()?,
                frequency_mhz: num(1)?,
            },
            ComponentKind::MessageSource => Component::MessageSource,
            ComponentKind::MessageSink => Component::MessageSink,
            ComponentKind::SimpleFramer => Component::SimpleFramer,
            ComponentKind::SimpleDeframer => Component::SimpleDeframer,
            ComponentKind::ManchesterEncoder => Component::ManchesterEncoder,
            ComponentKind::ManchesterDecoder => Component::ManchesterDecoder,
            ComponentKind::OokModulator => Component::OokModulator {
                frequency_khz: num(0)?,
            },
            ComponentKind::OokDemodulator => Component::OokDemodulator,
            ComponentKind::BitRateSampler => Component::BitRateSampler,
            ComponentKind::LowPassFilter => Component::LowPassFilter {
                bandwidth_khz: num(0)?,
            },
            ComponentKind::BandPassFilter => Component::BandPassFilter {
                low_cutoff_khz: num(0)?,
                high_cutoff_khz: num(1)?,
            },
        })
    }
}
