//! Test data builders for component chains

use radio_bridge::types::DisplayType;
use radio_bridge::Component;

pub fn radio_source() -> Component {
    Component::RadioSource {
        frequency_mhz: 433.5,
        gain: 30.0,
    }
}

pub fn display_sink() -> Component {
    Component::DisplaySink {
        display: DisplayType::Spectrum,
        frequency_mhz: 433.5,
    }
}

/// The processors of a complete OOK receive chain, in order
pub fn ook_receive_chain() -> Vec<(&'static str, Component)> {
    vec![
        ("lpf", Component::LowPassFilter { bandwidth_khz: 25.0 }),
        ("demod", Component::OokDemodulator),
        ("bits", Component::BitRateSampler),
        ("manchester", Component::ManchesterDecoder),
        ("frames", Component::SimpleDeframer),
    ]
}
