use crate::domain::booking::BookingRequest;
use crate::error::{BookingError, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read, Write};
use uuid::Uuid;

/// One line of the command stream, tagged by `op`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Submit(BookingRequest),
    Cancel {
        booking_id: Uuid,
        user_id: String,
    },
    Search {
        source: String,
        destination: String,
        date: chrono::NaiveDate,
    },
    ListBookings {
        user_id: String,
    },
    ListStations,
}

/// Reads commands from a JSON-lines source.
///
/// Wraps any `Read` and yields one `Result<Command>` per non-blank line, so
/// large command files stream without loading into memory.
pub struct CommandReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .lines()
            .map(|line| {
                line.map_err(|e| BookingError::Storage(format!("read error: {e}")))
            })
            .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map(|line| {
                let line = line?;
                serde_json::from_str(&line)
                    .map_err(|e| BookingError::Validation(format!("bad command: {e}")))
            })
    }
}

/// Writes results as one JSON document per line.
pub struct JsonLinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value)?;
        writeln!(self.writer, "{line}")
            .map_err(|e| BookingError::Storage(format!("write error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{Gender, PaymentMethod};

    #[test]
    fn test_reader_submit_command() {
        let data = r#"{"op":"submit","train_id":"T1","class":"AC1","quoted_fare":"500","passengers":[{"name":"Alice","age":30,"gender":"female"}],"user_id":"user-1","payment":"upi","token":"tok-1"}"#;
        let commands: Vec<_> = CommandReader::new(data.as_bytes()).commands().collect();

        assert_eq!(commands.len(), 1);
        match commands[0].as_ref().unwrap() {
            Command::Submit(req) => {
                assert_eq!(req.train_id, "T1");
                assert_eq!(req.passengers[0].gender, Gender::Female);
                assert_eq!(req.payment, PaymentMethod::Upi);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn test_reader_cancel_and_blank_lines() {
        let id = Uuid::new_v4();
        let data = format!(
            "\n{{\"op\":\"cancel\",\"booking_id\":\"{id}\",\"user_id\":\"user-1\"}}\n\n"
        );
        let commands: Vec<_> = CommandReader::new(data.as_bytes()).commands().collect();

        assert_eq!(commands.len(), 1);
        assert_eq!(
            *commands[0].as_ref().unwrap(),
            Command::Cancel {
                booking_id: id,
                user_id: "user-1".to_string(),
            }
        );
    }

    #[test]
    fn test_reader_search_command() {
        let data = r#"{"op":"search","source":"NDLS","destination":"BCT","date":"2026-03-02"}"#;
        let commands: Vec<_> = CommandReader::new(data.as_bytes()).commands().collect();
        assert!(matches!(
            commands[0].as_ref().unwrap(),
            Command::Search { .. }
        ));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "{\"op\":\"list_stations\"}\nnot json";
        let results: Vec<_> = CommandReader::new(data.as_bytes()).commands().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            BookingError::Validation(_)
        ));
    }

    #[test]
    fn test_writer_emits_one_line_per_value() {
        let mut buf = Vec::new();
        let mut writer = JsonLinesWriter::new(&mut buf);
        writer.write(&serde_json::json!({"a": 1})).unwrap();
        writer.write(&serde_json::json!({"b": 2})).unwrap();

        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, "{\"a\":1}\n{\"b\":2}\n");
    }
}
