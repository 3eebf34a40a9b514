//! Wire-format codec for DNS messages.
//!
//! A [`Message`] owns a fixed 512-byte buffer and a cursor into it. Header
//! fields are read and written in place; questions and resource records are
//! decoded from or appended at the cursor, in message order.

mod error;
mod header;
mod name;
mod question;
mod record;

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

pub use error::{Error, Result};
pub use header::{rcode_message, HEADER_LEN, QUERY};
pub use question::{Question, RecordClass, RecordType};
pub use record::{GenericData, Payload, RData, ResourceRecord};

/// Largest message that is built or parsed.
pub const MAX_LEN: usize = 512;

/// Section a resource record is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Answer,
    NameServer,
    Additional,
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "answer" => Ok(Section::Answer),
            "nameserver" | "authority" => Ok(Section::NameServer),
            "additional" => Ok(Section::Additional),
            other => Err(Error::UnknownSection(other.to_owned())),
        }
    }
}

/// Every question and record of a message, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

#[derive(Clone)]
pub struct Message {
    buf: [u8; MAX_LEN],
    // end of meaningful data: bytes received, or the furthest byte written
    len: usize,
    cursor: usize,
    names_by_pos: HashMap<usize, String>,
    pos_by_name: HashMap<String, usize>,
}

impl Message {
    /// Creates an empty message to be built, with the cursor just past the
    /// header.
    pub fn new(id: u16) -> Self {
        let mut msg = Self {
            buf: [0u8; MAX_LEN],
            len: HEADER_LEN,
            cursor: HEADER_LEN,
            names_by_pos: HashMap::new(),
            pos_by_name: HashMap::new(),
        };
        msg.set_id(id);
        msg
    }

    /// Wraps the first `len` bytes of `buf` for decoding, with the cursor
    /// just past the header.
    pub fn from_received(buf: &[u8], len: usize) -> Result<Self> {
        if len > buf.len() {
            return Err(Error::Truncated {
                offset: 0,
                needed: len,
                available: buf.len(),
            });
        }
        if len > MAX_LEN {
            return Err(Error::TooLong(len));
        }
        if len < HEADER_LEN {
            return Err(Error::Truncated {
                offset: 0,
                needed: HEADER_LEN,
                available: len,
            });
        }

        let mut msg = Self::new(0);
        msg.buf[..len].copy_from_slice(&buf[..len]);
        msg.len = len;
        Ok(msg)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor, clamped to the buffer.
    pub fn seek(&mut self, pos: usize) {
        self.cursor = pos.min(MAX_LEN);
    }

    /// The bytes from the start of the message up to the cursor.
    pub fn get_used(&self) -> &[u8] {
        &self.buf[..self.cursor]
    }

    /// Decodes all four sections, starting just past the header. The
    /// cursor ends up after the last additional record.
    pub fn read_all(&mut self) -> Result<Sections> {
        self.cursor = HEADER_LEN;

        let mut sections = Sections::default();
        for _ in 0..self.get_qdcount() {
            sections.questions.push(self.get_question()?);
        }
        for _ in 0..self.get_ancount() {
            sections.answers.push(self.get_rr()?);
        }
        for _ in 0..self.get_nscount() {
            sections.authorities.push(self.get_rr()?);
        }
        for _ in 0..self.get_arcount() {
            sections.additionals.push(self.get_rr()?);
        }
        Ok(sections)
    }

    /// Renders the header and every section for diagnostics.
    ///
    /// The cursor is restored afterwards whether or not decoding succeeded,
    /// so this can be called at any point while building or reading.
    pub fn dump(&mut self) -> String {
        let saved = self.cursor;
        let rendered = self.render();
        self.cursor = saved;

        rendered.unwrap_or_else(|e| format!("failed to render message: {e}"))
    }

    fn render(&mut self) -> Result<String> {
        let mut out = String::new();
        // fmt::Write for String never fails
        let _ = writeln!(
            out,
            "ID: {} QR: {} OP: {} AA: {}",
            self.get_id(),
            self.get_qr(),
            self.get_opcode(),
            self.get_aa()
        );
        let _ = writeln!(
            out,
            "TC: {} RD: {} RA: {} RCODE: {} {}",
            self.get_tc(),
            self.get_rd(),
            self.get_ra(),
            self.get_rcode(),
            rcode_message(self.get_rcode())
        );
        let _ = writeln!(
            out,
            "QDCount: {} ANCount: {} NSCount: {} ARCount: {}",
            self.get_qdcount(),
            self.get_ancount(),
            self.get_nscount(),
            self.get_arcount()
        );

        let sections = self.read_all()?;
        let _ = writeln!(out, "Question [{}]", sections.questions.len());
        for (i, question) in sections.questions.iter().enumerate() {
            let _ = writeln!(out, "[{i}] {question}");
        }
        for (kind, records) in [
            ("Answers", &sections.answers),
            ("Name servers", &sections.authorities),
            ("Additional", &sections.additionals),
        ] {
            let _ = writeln!(out, "{kind} [{}]", records.len());
            for (i, rr) in records.iter().enumerate() {
                let _ = writeln!(out, "[{i}] {rr}");
            }
        }
        Ok(out)
    }

    /// Runs `write` at the cursor. If it fails, the cursor and the name
    /// tables are put back as they were.
    fn append(&mut self, write: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let start = self.cursor;
        let len = self.len;

        // anything recorded at or past `start` is about to be overwritten
        self.forget_names_from(start);

        let result = write(self);
        if result.is_err() {
            self.cursor = start;
            self.len = len;
            self.forget_names_from(start);
        }
        result
    }

    fn forget_names_from(&mut self, start: usize) {
        self.names_by_pos.retain(|&pos, _| pos < start);
        self.pos_by_name.retain(|_, &mut pos| pos < start);
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let start = self.cursor;
        if start + n > self.len {
            return Err(Error::Truncated {
                offset: start,
                needed: n,
                available: self.len.saturating_sub(start),
            });
        }
        self.cursor += n;
        Ok(&self.buf[start..start + n])
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let start = self.cursor;
        if start + bytes.len() > MAX_LEN {
            return Err(Error::BufferFull {
                offset: start,
                needed: bytes.len(),
            });
        }
        self.buf[start..start + bytes.len()].copy_from_slice(bytes);
        self.cursor += bytes.len();
        self.len = self.len.max(self.cursor);
        Ok(())
    }

    fn put_u8(&mut self, value: u8) -> Result<()> {
        self.put(&[value])
    }

    fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    fn patch_u16(&mut self, at: usize, value: u16) {
        self.buf[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clone().dump())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.get_id())
            .field("len", &self.len)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_is_just_a_header() {
        let msg = Message::new(0x1234);
        assert_eq!(msg.get_used(), &[0x12, 0x34, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(msg.position(), HEADER_LEN);
    }

    #[test]
    fn received_length_is_checked() {
        let buf = [0u8; 600];
        assert_eq!(
            Message::from_received(&buf, 11).unwrap_err(),
            Error::Truncated {
                offset: 0,
                needed: 12,
                available: 11
            }
        );
        assert_eq!(
            Message::from_received(&buf, 513).unwrap_err(),
            Error::TooLong(513)
        );
        assert!(Message::from_received(&buf[..20], 30).is_err());
        assert_eq!(Message::from_received(&buf, 12).unwrap().position(), 12);
    }

    #[test]
    fn reading_stops_at_received_length() {
        let mut buf = [0u8; 64];
        buf[5] = 1; // QDCOUNT = 1
        buf[12..16].copy_from_slice(b"\x01a\x00\x00");
        let mut msg = Message::from_received(&buf, 16).unwrap();
        assert!(matches!(
            msg.get_question(),
            Err(Error::Truncated { offset: 15, .. })
        ));
    }

    #[test]
    fn section_tags() {
        assert_eq!("answer".parse::<Section>(), Ok(Section::Answer));
        assert_eq!("nameserver".parse::<Section>(), Ok(Section::NameServer));
        assert_eq!("authority".parse::<Section>(), Ok(Section::NameServer));
        assert_eq!("additional".parse::<Section>(), Ok(Section::Additional));
        assert_eq!(
            "answers".parse::<Section>(),
            Err(Error::UnknownSection("answers".into()))
        );
    }

    #[test]
    fn dump_restores_the_cursor() {
        let mut msg = Message::new(42);
        msg.set_rd(true);
        msg.add_question(&Question::new("example.com", RecordType::A, RecordClass::IN))
            .unwrap();
        let end = msg.position();

        let first = msg.dump();
        assert_eq!(msg.position(), end);
        assert_eq!(msg.dump(), first);
        assert_eq!(msg.to_string(), first);
        assert!(first.starts_with("ID: 42 QR: false OP: 0 AA: false\n"));
        assert!(first.contains("RD: true"));
        assert!(first.contains("RCODE: 0 No error"));
        assert!(first.contains("Question [1]\n[0] example.com IN A\n"));
        assert!(first.ends_with("Answers [0]\nName servers [0]\nAdditional [0]\n"));
    }

    #[test]
    fn dump_reports_failure_and_restores_the_cursor() {
        let mut buf = [0u8; 16];
        buf[7] = 1; // ANCOUNT = 1, but no record follows
        let mut msg = Message::from_received(&buf, 16).unwrap();
        msg.seek(14);

        assert!(msg.dump().starts_with("failed to render message: "));
        assert_eq!(msg.position(), 14);
    }
}
