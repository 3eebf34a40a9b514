use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::trace;

use super::{name, Error, Message, Question, RecordClass, RecordType, Result, Section};

/// Payload of a resource record. The variant determines the record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Mx { preference: u16, exchange: String },
    Generic(GenericData),
}

impl RData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RData::A(_) => RecordType::A,
            RData::Aaaa(_) => RecordType::AAAA,
            RData::Mx { .. } => RecordType::MX,
            RData::Generic(data) => data.rtype,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{addr}"),
            RData::Aaaa(addr) => write!(f, "{addr}"),
            RData::Mx {
                preference,
                exchange,
            } => write!(f, "{preference} {}", name::display(exchange)),
            RData::Generic(data) => write!(f, "{}", data.payload),
        }
    }
}

/// Payload of any record type other than A, AAAA and MX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericData {
    rtype: RecordType,
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A single, possibly compressed, domain name (NS, CNAME, PTR, ...).
    Name(String),
    /// Anything that doesn't read as exactly one name.
    Raw(Vec<u8>),
}

impl GenericData {
    pub fn new(rtype: RecordType, payload: Payload) -> Result<Self> {
        // TYPE1 and friends must not sneak past as `Unknown`
        let rtype = RecordType::from(u16::from(rtype));
        match rtype {
            RecordType::A | RecordType::AAAA | RecordType::MX => Err(Error::PayloadMismatch(rtype)),
            rtype => Ok(Self { rtype, payload }),
        }
    }

    pub fn name(rtype: RecordType, name: impl Into<String>) -> Result<Self> {
        Self::new(rtype, Payload::Name(name.into()))
    }

    pub fn raw(rtype: RecordType, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::new(rtype, Payload::Raw(bytes.into()))
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Name(target) => f.write_str(name::display(target)),
            Payload::Raw(bytes) => bytes.iter().try_for_each(|b| write!(f, "{b:02x}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    question: Question,
    ttl: u32,
    rdata: RData,
}

impl ResourceRecord {
    pub fn new(name: impl Into<String>, class: RecordClass, ttl: u32, rdata: RData) -> Self {
        Self {
            question: Question::new(name, rdata.record_type(), class),
            ttl,
            rdata,
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn name(&self) -> &str {
        &self.question.name
    }

    pub fn record_type(&self) -> RecordType {
        self.question.rtype
    }

    pub fn class(&self) -> RecordClass {
        self.question.class
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn rdata(&self) -> &RData {
        &self.rdata
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            name::display(self.name()),
            self.ttl,
            self.class(),
            self.record_type(),
            self.rdata
        )
    }
}

impl Message {
    /// Decodes the resource record at the cursor.
    ///
    /// On failure the cursor is left wherever decoding stopped; the rest of
    /// the message should be discarded.
    pub fn get_rr(&mut self) -> Result<ResourceRecord> {
        let question = self.get_question()?;
        let ttl = self.read_u32()?;
        let rdlength = self.read_u16()? as usize;

        let start = self.cursor;
        let end = start + rdlength;
        if end > self.len {
            return Err(Error::Truncated {
                offset: start,
                needed: rdlength,
                available: self.len - start,
            });
        }

        let rdata = match question.rtype {
            RecordType::A => RData::A(self.read_address::<4>(RecordType::A, rdlength)?.into()),
            RecordType::AAAA => {
                RData::Aaaa(self.read_address::<16>(RecordType::AAAA, rdlength)?.into())
            }
            RecordType::MX => {
                let preference = self.read_u16()?;
                let exchange = self.get_name()?;
                if self.cursor != end {
                    return Err(Error::RdataLength {
                        declared: rdlength,
                        decoded: self.cursor - start,
                    });
                }
                RData::Mx {
                    preference,
                    exchange,
                }
            }
            rtype => RData::Generic(self.read_generic(rtype, start, end)?),
        };

        Ok(ResourceRecord {
            question,
            ttl,
            rdata,
        })
    }

    /// Appends a resource record to `section` and bumps that section's
    /// count. RDLENGTH is computed from what was actually written.
    pub fn add_resource_record(&mut self, rr: &ResourceRecord, section: Section) -> Result<()> {
        self.append(|msg| {
            msg.write_question(&rr.question)?;
            msg.put_u32(rr.ttl)?;

            let length_at = msg.cursor;
            msg.put_u16(0)?;
            let start = msg.cursor;

            match &rr.rdata {
                RData::A(addr) => msg.put(&addr.octets())?,
                RData::Aaaa(addr) => msg.put(&addr.octets())?,
                RData::Mx {
                    preference,
                    exchange,
                } => {
                    msg.put_u16(*preference)?;
                    msg.write_name(exchange)?;
                }
                RData::Generic(data) => match &data.payload {
                    Payload::Name(target) => msg.write_name(target)?,
                    Payload::Raw(bytes) => msg.put(bytes)?,
                },
            }

            let rdlength = (msg.cursor - start) as u16;
            msg.patch_u16(length_at, rdlength);
            Ok(())
        })?;

        match section {
            Section::Answer => self.bump_ancount(),
            Section::NameServer => self.bump_nscount(),
            Section::Additional => self.bump_arcount(),
        }
        Ok(())
    }

    fn read_address<const N: usize>(&mut self, rtype: RecordType, rdlength: usize) -> Result<[u8; N]> {
        if rdlength != N {
            return Err(Error::UnsupportedAddress {
                rtype,
                len: rdlength,
            });
        }
        let mut octets = [0u8; N];
        octets.copy_from_slice(self.take(N)?);
        Ok(octets)
    }

    fn read_generic(&mut self, rtype: RecordType, start: usize, end: usize) -> Result<GenericData> {
        if end > start {
            match self.get_name() {
                Ok(target) if self.cursor == end => {
                    return GenericData::name(rtype, target);
                }
                Ok(_) => trace!("{} payload at {} is not a single name", rtype, start),
                Err(e) => trace!("{} payload at {} is not a name: {}", rtype, start, e),
            }
            self.cursor = start;
        }
        let bytes = self.take(end - start)?.to_vec();
        GenericData::raw(rtype, bytes)
    }
}
