//! Line-oriented command language for driving a bridge from text.
//!
//! One command per line; blank lines and `#` comments are ignored.
//!
//! ```text
//! reset
//! create radio-source rx 433.92 40
//! create low-pass-filter lpf 25
//! create ook-demodulator demod
//! create bit-rate-sampler bits
//! create manchester-decoder dec
//! create simple-deframer frames
//! create message-sink inbox
//! from rx
//! create display-sink scope waterfall 433.92
//! start
//! errors
//! receive
//! send hello world
//! status
//! stop
//! quit
//! ```

use crate::backend::BridgeCommand;
use crate::error::{BridgeError, Result};
use crate::graph::Component;
use crate::types::ComponentKind;

/// Parse one script line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<BridgeCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let err = |message: String| BridgeError::Script {
        line: line_no,
        message,
    };

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let no_args = |cmd: BridgeCommand| {
        if args.is_empty() {
            Ok(cmd)
        } else {
            Err(err(format!("'{}' takes no arguments", verb)))
        }
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "reset" => no_args(BridgeCommand::Reset)?,
        "start" => no_args(BridgeCommand::Start)?,
        "stop" => no_args(BridgeCommand::Stop)?,
        "running" => no_args(BridgeCommand::QueryRunning)?,
        "status" => no_args(BridgeCommand::QueryStatus)?,
        "receive" => no_args(BridgeCommand::ReceiveMessage)?,
        "errors" => no_args(BridgeCommand::WatchErrors)?,
        "quit" | "exit" => no_args(BridgeCommand::Shutdown)?,
        // Payload keeps its inner spacing
        "send" => BridgeCommand::SendMessage(rest.to_string()),
        "from" => match args.as_slice() {
            [producer] => BridgeCommand::SourceFrom(producer.to_string()),
            _ => return Err(err("usage: from <producer>".to_string())),
        },
        "create" => {
            let [kind, name, params @ ..] = args.as_slice() else {
                return Err(err("usage: create <type> <name> [params...]".to_string()));
            };
            let kind: ComponentKind = kind.parse().map_err(err)?;
            let component = Component::from_args(kind, params).map_err(err)?;
            BridgeCommand::Create {
                name: name.to_string(),
                component,
            }
        }
        other => return Err(err(format!("unknown command '{}'", other))),
    };

    Ok(Some(cmd))
}

/// Parse a whole script, stopping at the first bad line
pub fn parse_script(text: &str) -> Result<Vec<BridgeCommand>> {
    let mut commands = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(cmd) = parse_line(index + 1, line)? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisplayType;

    #[test]
    fn test_skips_blank_and_comments() {
        assert!(parse_line(1, "").unwrap().is_none());
        assert!(parse_line(2, "   # set up").unwrap().is_none());
    }

    #[test]
    fn test_simple_verbs() {
        assert!(matches!(parse_line(1, "START").unwrap(), Some(BridgeCommand::Start)));
        assert!(matches!(
            parse_line(1, "status").unwrap(),
            Some(BridgeCommand::QueryStatus)
        ));
        assert!(parse_line(1, "stop now").is_err());
    }

    #[test]
    fn test_send_keeps_spacing() {
        match parse_line(1, "send  hello   world").unwrap() {
            Some(BridgeCommand::SendMessage(text)) => assert_eq!(text, "hello   world"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_display_sink() {
        match parse_line(1, "create DISPLAY-SINK scope waterfall 100").unwrap() {
            Some(BridgeCommand::Create { name, component }) => {
                assert_eq!(name, "scope");
                assert_eq!(
                    component,
                    Component::DisplaySink {
                        display: DisplayType::Waterfall,
                        frequency_mhz: 100.0
                    }
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_errors_carry_line_number() {
        let err = parse_line(7, "create warp-drive w").unwrap_err();
        assert!(matches!(err, BridgeError::Script { line: 7, .. }));

        let err = parse_line(3, "create radio-source rx").unwrap_err();
        assert!(err.to_string().contains("line 3"));

        assert!(parse_line(1, "create").is_err());
        assert!(parse_line(1, "launch").is_err());
    }

    #[test]
    fn test_parse_script() {
        let commands = parse_script(
            "reset\n\
             # chain\n\
             create message-source msg\n\
             create simple-framer fr\n\
             from msg\n\
             quit\n",
        )
        .unwrap();
        let labels: Vec<_> = commands.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["reset", "create", "create", "from", "quit"]);

        let err = parse_script("start\nbogus\n").unwrap_err();
        assert!(matches!(err, BridgeError::Script { line: 2, .. }));
    }
}
