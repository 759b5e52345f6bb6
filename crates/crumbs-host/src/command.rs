//! Leader command lines.
//!
//! The interactive leader accepts one command per line:
//!
//! - `addr,typeID,commandType,d0,...,dN-1[,errorFlags]`: send a message.
//!   The error-flags field is present only for revisions without a CRC.
//! - `request,addr`: read one message from a peripheral.
//! - `help`, `exit` / `quit`.
//!
//! Addresses are decimal or `0x`-prefixed hex.

use crumbs_protocol::{Message, Revision};

use crate::controller::validate_address;
use crate::error::{HostError, HostResult};

/// One parsed leader command.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderCommand<R: Revision> {
    /// Send `message` to `address`.
    Send {
        /// Target address.
        address: u8,
        /// Message to encode.
        message: Message<R>,
    },
    /// Request one message from `address`.
    Request {
        /// Target address.
        address: u8,
    },
    /// Print usage.
    Help,
    /// Leave the loop.
    Exit,
}

/// Parse a decimal or `0x`-prefixed hex integer.
fn parse_int(field: &str) -> Option<u64> {
    let field = field.trim();
    match field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => field.parse().ok(),
    }
}

fn parse_u8(field: &str, name: &str) -> HostResult<u8> {
    parse_int(field)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| {
            HostError::parse(format!(
                "invalid {} {:?}: expected 0-255",
                name,
                field.trim()
            ))
        })
}

/// Parse a 7-bit I2C address.
pub fn parse_address(field: &str) -> HostResult<u8> {
    let address = parse_u8(field, "address")?;
    validate_address(address)
}

impl<R: Revision> LeaderCommand<R> {
    /// Parse one input line.
    pub fn parse(line: &str) -> HostResult<Self> {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "exit" | "quit" => return Ok(LeaderCommand::Exit),
            "help" | "?" => return Ok(LeaderCommand::Help),
            "" => return Err(HostError::parse("empty command")),
            _ => {}
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();

        if parts[0].eq_ignore_ascii_case("request") {
            if parts.len() != 2 {
                return Err(HostError::parse(format!(
                    "invalid request format: expected \"request,<address>\", got {} fields",
                    parts.len()
                )));
            }
            return Ok(LeaderCommand::Request {
                address: parse_address(parts[1])?,
            });
        }

        let has_flags = !R::REVISION.has_crc();
        let min_fields = 3 + usize::from(has_flags);
        if parts.len() <= min_fields {
            return Err(HostError::parse(format!(
                "expected {} fields, got {}",
                min_fields + R::PAYLOAD_LEN,
                parts.len()
            )));
        }

        let address = parse_address(parts[0])?;
        let type_id = parse_u8(parts[1], "typeID")?;
        let command_type = parse_u8(parts[2], "commandType")?;

        let data_end = if has_flags { parts.len() - 1 } else { parts.len() };
        let data = parts[3..data_end]
            .iter()
            .map(|field| {
                field
                    .parse::<f32>()
                    .map_err(|_| HostError::parse(format!("invalid data value {:?}", field)))
            })
            .collect::<HostResult<Vec<f32>>>()?;

        let trailer = if has_flags {
            parse_u8(parts[parts.len() - 1], "errorFlags")?
        } else {
            0
        };

        let message = Message::<R>::from_slice(
            type_id,
            command_type,
            &data,
            R::check_from_trailer(trailer),
        )?;
        Ok(LeaderCommand::Send { address, message })
    }
}

/// Usage text for revision `R`.
pub fn usage<R: Revision>() -> String {
    let data: Vec<String> = (0..R::PAYLOAD_LEN).map(|i| format!("data{}", i)).collect();
    let example: Vec<&str> = ["75.0", "1.0", "0.0", "65.0", "2.0", "7.0", "0.0"]
        .into_iter()
        .take(R::PAYLOAD_LEN)
        .collect();
    let (flags, flags_example) = if R::REVISION.has_crc() {
        ("", "")
    } else {
        (",errorFlags", ",0")
    };
    format!(
        "Usage (revision {rev}):\n  \
         To send a message, enter comma-separated values:\n    \
         target_address,typeID,commandType,{data}{flags}\n  \
         Example:\n    \
         0x08,1,1,{example}{flags_example}\n\n  \
         To request a message from a target device, type:\n    \
         request,target_address\n  \
         Example:\n    \
         request,0x08\n\n  \
         Type 'exit' to quit.",
        rev = R::REVISION,
        data = data.join(","),
        example = example.join(","),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumbs_protocol::{ErrorFlags, ProtocolError, RevisionA, RevisionB};

    #[test]
    fn test_parse_send_revision_a() {
        let cmd =
            LeaderCommand::<RevisionA>::parse("0x08,1,1,75.0,1.0,0.0,65.0,2.0,7.0,0").unwrap();
        match cmd {
            LeaderCommand::Send { address, message } => {
                assert_eq!(address, 0x08);
                assert_eq!(message.type_id, 1);
                assert_eq!(message.command_type, 1);
                assert_eq!(message.payload, [75.0, 1.0, 0.0, 65.0, 2.0, 7.0]);
                assert_eq!(message.check, ErrorFlags(0));
            }
            other => panic!("expected Send, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_send_revision_b() {
        let cmd = LeaderCommand::<RevisionB>::parse("8, 2, 3, 1, 2, 3, 4, 5, 6, 7").unwrap();
        match cmd {
            LeaderCommand::Send { address, message } => {
                assert_eq!(address, 8);
                assert_eq!(message.type_id, 2);
                assert_eq!(message.command_type, 3);
                assert_eq!(message.payload, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
            }
            other => panic!("expected Send, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_wrong_data_count() {
        let err = LeaderCommand::<RevisionB>::parse("8,1,1,1,2,3,4,5,6").unwrap_err();
        assert!(matches!(
            err,
            HostError::Protocol(ProtocolError::LengthMismatch {
                expected: 7,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_parse_request() {
        assert_eq!(
            LeaderCommand::<RevisionB>::parse("request,0x08").unwrap(),
            LeaderCommand::Request { address: 0x08 }
        );
        assert_eq!(
            LeaderCommand::<RevisionA>::parse("REQUEST, 16").unwrap(),
            LeaderCommand::Request { address: 16 }
        );
        assert!(LeaderCommand::<RevisionA>::parse("request").is_err());
    }

    #[test]
    fn test_parse_exit_and_help() {
        assert_eq!(
            LeaderCommand::<RevisionB>::parse(" exit ").unwrap(),
            LeaderCommand::Exit
        );
        assert_eq!(
            LeaderCommand::<RevisionB>::parse("QUIT").unwrap(),
            LeaderCommand::Exit
        );
        assert_eq!(
            LeaderCommand::<RevisionB>::parse("help").unwrap(),
            LeaderCommand::Help
        );
    }

    #[test]
    fn test_parse_bad_fields() {
        assert!(matches!(
            LeaderCommand::<RevisionB>::parse("0x80,1,1,1,2,3,4,5,6,7"),
            Err(HostError::InvalidAddress(0x80))
        ));
        assert!(matches!(
            LeaderCommand::<RevisionB>::parse("8,256,1,1,2,3,4,5,6,7"),
            Err(HostError::Parse(_))
        ));
        assert!(matches!(
            LeaderCommand::<RevisionB>::parse("8,1,1,x,2,3,4,5,6,7"),
            Err(HostError::Parse(_))
        ));
        assert!(matches!(
            LeaderCommand::<RevisionA>::parse("8,1,1,1,2,3,4,5,6,flags"),
            Err(HostError::Parse(_))
        ));
        assert!(matches!(
            LeaderCommand::<RevisionA>::parse("8,1,1"),
            Err(HostError::Parse(_))
        ));
        assert!(matches!(
            LeaderCommand::<RevisionA>::parse(""),
            Err(HostError::Parse(_))
        ));
    }

    #[test]
    fn test_usage_mentions_fields() {
        let text = usage::<RevisionA>();
        assert!(text.contains("data5,errorFlags"));
        assert!(text.contains("0x08,1,1,75.0,1.0,0.0,65.0,2.0,7.0,0"));

        let text = usage::<RevisionB>();
        assert!(text.contains("data6\n"));
        assert!(!text.contains("errorFlags"));
    }
}
