//! Decode events and their line-oriented text form
//!
//! One event per line, tab separated:
//!
//! ```text
//! payload
//! payload<TAB>symbology
//! payload<TAB>symbology<TAB>decoded_at_ms
//! ```

use crate::core::time::Clock;
use crate::store::Symbology;

/// A single raw decoder detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeEvent {
    pub payload: String,
    pub symbology: String,
    /// Milliseconds since the Unix epoch
    pub decoded_at: i64,
}

impl DecodeEvent {
    pub fn new(payload: impl Into<String>, symbology: impl Into<String>, decoded_at: i64) -> Self {
        Self {
            payload: payload.into(),
            symbology: symbology.into(),
            decoded_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeLineError {
    #[error("Line {line}: empty payload")]
    EmptyPayload { line: usize },

    #[error("Line {line}: invalid timestamp '{value}' (expected milliseconds since epoch)")]
    InvalidTimestamp { line: usize, value: String },

    #[error("Line {line}: too many fields ({count}, at most 3)")]
    TooManyFields { line: usize, count: usize },
}

impl crate::core::error_handling::ContextualError for DecodeLineError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Parse one input line
///
/// `Ok(None)` for blank lines. A missing symbology defaults to QR and a
/// missing timestamp is taken from `clock`. `line_number` is only used in
/// error messages.
pub fn parse_line(
    line: &str,
    line_number: usize,
    clock: &dyn Clock,
) -> Result<Option<DecodeEvent>, DecodeLineError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() > 3 {
        return Err(DecodeLineError::TooManyFields {
            line: line_number,
            count: fields.len(),
        });
    }

    let payload = fields[0];
    if payload.is_empty() {
        return Err(DecodeLineError::EmptyPayload { line: line_number });
    }

    let symbology = match fields.get(1).map(|s| s.trim()) {
        Some(tag) if !tag.is_empty() => tag.to_string(),
        _ => Symbology::Qr.name().to_string(),
    };

    let decoded_at = match fields.get(2).map(|s| s.trim()) {
        Some(value) if !value.is_empty() => {
            value
                .parse::<i64>()
                .map_err(|_| DecodeLineError::InvalidTimestamp {
                    line: line_number,
                    value: value.to_string(),
                })?
        }
        _ => clock.now_millis(),
    };

    Ok(Some(DecodeEvent {
        payload: payload.to_string(),
        symbology,
        decoded_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::ManualClock;

    #[test]
    fn test_payload_only_defaults() {
        let clock = ManualClock::new(42_000);
        let event = parse_line("ABC123\n", 1, &clock).unwrap().unwrap();

        assert_eq!(event, DecodeEvent::new("ABC123", "qr", 42_000));
    }

    #[test]
    fn test_all_fields() {
        let clock = ManualClock::new(0);
        let event = parse_line("4006381333931\tean13\t1700000000000", 1, &clock)
            .unwrap()
            .unwrap();

        assert_eq!(event.payload, "4006381333931");
        assert_eq!(event.symbology, "ean13");
        assert_eq!(event.decoded_at, 1_700_000_000_000);
    }

    #[test]
    fn test_payload_whitespace_is_preserved() {
        let clock = ManualClock::new(5);
        let event = parse_line("  hello world \tcode128\r\n", 1, &clock)
            .unwrap()
            .unwrap();

        assert_eq!(event.payload, "  hello world ");
        assert_eq!(event.symbology, "code128");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let clock = ManualClock::new(0);
        assert_eq!(parse_line("", 1, &clock).unwrap(), None);
        assert_eq!(parse_line("   \r\n", 2, &clock).unwrap(), None);
    }

    #[test]
    fn test_empty_symbology_defaults_to_qr() {
        let clock = ManualClock::new(9);
        let event = parse_line("X\t\t100", 1, &clock).unwrap().unwrap();
        assert_eq!(event.symbology, "qr");
        assert_eq!(event.decoded_at, 100);
    }

    #[test]
    fn test_errors() {
        let clock = ManualClock::new(0);

        assert_eq!(
            parse_line("X\tqr\tsoon", 4, &clock),
            Err(DecodeLineError::InvalidTimestamp {
                line: 4,
                value: "soon".to_string()
            })
        );
        assert_eq!(
            parse_line("\tqr", 5, &clock),
            Err(DecodeLineError::EmptyPayload { line: 5 })
        );
        assert_eq!(
            parse_line("a\tb\tc\td", 6, &clock),
            Err(DecodeLineError::TooManyFields { line: 6, count: 4 })
        );
    }
}
