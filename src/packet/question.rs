use std::fmt;
use std::str::FromStr;

use super::{name, Message, Result};

/// Type of a question or resource record.
///
/// Codes without a variant of their own decode to [`RecordType::Unknown`],
/// which keeps the raw code so the record can still be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    Unknown(u16),
}

impl From<u16> for RecordType {
    fn from(code: u16) -> Self {
        match code {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            12 => RecordType::PTR,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            code => RecordType::Unknown(code),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(rtype: RecordType) -> Self {
        match rtype {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::Unknown(code) => code,
        }
    }
}

impl FromStr for RecordType {
    type Err = String;

    /// Parses a mnemonic such as `aaaa`, or the generic `TYPE<n>` form.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let rtype = match upper.as_str() {
            "A" => RecordType::A,
            "NS" => RecordType::NS,
            "CNAME" => RecordType::CNAME,
            "SOA" => RecordType::SOA,
            "PTR" => RecordType::PTR,
            "MX" => RecordType::MX,
            "TXT" => RecordType::TXT,
            "AAAA" => RecordType::AAAA,
            other => match other.strip_prefix("TYPE").map(str::parse::<u16>) {
                Some(Ok(code)) => RecordType::from(code),
                _ => return Err(format!("unknown record type: {s}")),
            },
        };
        Ok(rtype)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::NS => f.write_str("NS"),
            RecordType::CNAME => f.write_str("CNAME"),
            RecordType::SOA => f.write_str("SOA"),
            RecordType::PTR => f.write_str("PTR"),
            RecordType::MX => f.write_str("MX"),
            RecordType::TXT => f.write_str("TXT"),
            RecordType::AAAA => f.write_str("AAAA"),
            RecordType::Unknown(code) => write!(f, "TYPE{code}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordClass {
    IN,
    CH,
    HS,
    Unknown(u16),
}

impl From<u16> for RecordClass {
    fn from(code: u16) -> Self {
        match code {
            1 => RecordClass::IN,
            3 => RecordClass::CH,
            4 => RecordClass::HS,
            code => RecordClass::Unknown(code),
        }
    }
}

impl From<RecordClass> for u16 {
    fn from(class: RecordClass) -> Self {
        match class {
            RecordClass::IN => 1,
            RecordClass::CH => 3,
            RecordClass::HS => 4,
            RecordClass::Unknown(code) => code,
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordClass::IN => f.write_str("IN"),
            RecordClass::CH => f.write_str("CH"),
            RecordClass::HS => f.write_str("HS"),
            RecordClass::Unknown(code) => write!(f, "CLASS{code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    pub name: String,
    pub rtype: RecordType,
    pub class: RecordClass,
}

impl Question {
    pub fn new(name: impl Into<String>, rtype: RecordType, class: RecordClass) -> Self {
        Self {
            name: name.into(),
            rtype,
            class,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", name::display(&self.name), self.class, self.rtype)
    }
}

impl Message {
    /// Decodes the question at the cursor.
    pub fn get_question(&mut self) -> Result<Question> {
        let name = self.get_name()?;
        let rtype = self.read_u16()?.into();
        let class = self.read_u16()?.into();
        Ok(Question { name, rtype, class })
    }

    /// Appends a question and bumps QDCOUNT.
    pub fn add_question(&mut self, question: &Question) -> Result<()> {
        self.append(|msg| msg.write_question(question))?;
        self.bump_qdcount();
        Ok(())
    }

    pub(super) fn write_question(&mut self, question: &Question) -> Result<()> {
        self.write_name(&question.name)?;
        self.put_u16(question.rtype.into())?;
        self.put_u16(question.class.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::HEADER_LEN;

    #[test]
    fn question_round_trip() {
        let mut msg = Message::new(7);
        let question = Question::new("example.com", RecordType::MX, RecordClass::IN);
        msg.add_question(&question).unwrap();
        assert_eq!(
            &msg.get_used()[HEADER_LEN..],
            b"\x07example\x03com\x00\x00\x0f\x00\x01"
        );
        assert_eq!(msg.get_qdcount(), 1);

        msg.seek(HEADER_LEN);
        assert_eq!(msg.get_question().unwrap(), question);
    }

    #[test]
    fn unknown_codes_are_kept() {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes.extend_from_slice(b"\x00\x00\x63\x00\xfe");
        let mut msg = Message::from_received(&bytes, bytes.len()).unwrap();
        let question = msg.get_question().unwrap();
        assert_eq!(question.name, "");
        assert_eq!(question.rtype, RecordType::Unknown(99));
        assert_eq!(question.class, RecordClass::Unknown(254));
        assert_eq!(question.to_string(), ". CLASS254 TYPE99");
    }

    #[test]
    fn truncated_question_fails() {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes.extend_from_slice(b"\x03com\x00\x00\x01\x00");
        let mut msg = Message::from_received(&bytes, bytes.len()).unwrap();
        assert!(msg.get_question().is_err());
    }

    #[test]
    fn record_type_parsing() {
        assert_eq!("aaaa".parse::<RecordType>(), Ok(RecordType::AAAA));
        assert_eq!("Mx".parse::<RecordType>(), Ok(RecordType::MX));
        assert_eq!("TYPE28".parse::<RecordType>(), Ok(RecordType::AAAA));
        assert_eq!("type99".parse::<RecordType>(), Ok(RecordType::Unknown(99)));
        assert!("BOGUS".parse::<RecordType>().is_err());
        assert_eq!(RecordType::Unknown(99).to_string(), "TYPE99");
    }
}
