//! Accessors for the fixed 12-byte header at the front of every message.
//!
//! Every field is read from and written to the message buffer directly;
//! nothing is cached on the side. Setters only touch the bits that belong
//! to their field.

use super::Message;

pub const HEADER_LEN: usize = 12;

/// Opcode of a standard query.
pub const QUERY: u8 = 0;

const QR_MASK: u8 = 0b1000_0000;
const OPCODE_MASK: u8 = 0b0111_1000;
const OPCODE_SHIFT: u8 = 3;
const AA_MASK: u8 = 0b0000_0100;
const TC_MASK: u8 = 0b0000_0010;
const RD_MASK: u8 = 0b0000_0001;
const RA_MASK: u8 = 0b1000_0000;
const RCODE_MASK: u8 = 0b0000_1111;

const QDCOUNT: usize = 4;
const ANCOUNT: usize = 6;
const NSCOUNT: usize = 8;
const ARCOUNT: usize = 10;

impl Message {
    pub fn get_id(&self) -> u16 {
        self.read_header_u16(0)
    }

    pub fn set_id(&mut self, id: u16) {
        self.write_header_u16(0, id);
    }

    pub fn get_qr(&self) -> bool {
        self.buf[2] & QR_MASK != 0
    }

    pub fn set_qr(&mut self, qr: bool) {
        self.set_flag(2, QR_MASK, qr);
    }

    pub fn get_opcode(&self) -> u8 {
        (self.buf[2] & OPCODE_MASK) >> OPCODE_SHIFT
    }

    /// Sets the 4-bit opcode. Higher bits of `opcode` are dropped.
    pub fn set_opcode(&mut self, opcode: u8) {
        self.buf[2] = (self.buf[2] & !OPCODE_MASK) | ((opcode << OPCODE_SHIFT) & OPCODE_MASK);
    }

    pub fn get_aa(&self) -> bool {
        self.buf[2] & AA_MASK != 0
    }

    pub fn set_aa(&mut self, aa: bool) {
        self.set_flag(2, AA_MASK, aa);
    }

    pub fn get_tc(&self) -> bool {
        self.buf[2] & TC_MASK != 0
    }

    pub fn set_tc(&mut self, tc: bool) {
        self.set_flag(2, TC_MASK, tc);
    }

    pub fn get_rd(&self) -> bool {
        self.buf[2] & RD_MASK != 0
    }

    pub fn set_rd(&mut self, rd: bool) {
        self.set_flag(2, RD_MASK, rd);
    }

    pub fn get_ra(&self) -> bool {
        self.buf[3] & RA_MASK != 0
    }

    pub fn set_ra(&mut self, ra: bool) {
        self.set_flag(3, RA_MASK, ra);
    }

    pub fn get_rcode(&self) -> u8 {
        self.buf[3] & RCODE_MASK
    }

    /// Sets the 4-bit response code. Higher bits of `rcode` are dropped.
    pub fn set_rcode(&mut self, rcode: u8) {
        self.buf[3] = (self.buf[3] & !RCODE_MASK) | (rcode & RCODE_MASK);
    }

    pub fn get_qdcount(&self) -> u16 {
        self.read_header_u16(QDCOUNT)
    }

    pub fn get_ancount(&self) -> u16 {
        self.read_header_u16(ANCOUNT)
    }

    pub fn get_nscount(&self) -> u16 {
        self.read_header_u16(NSCOUNT)
    }

    pub fn get_arcount(&self) -> u16 {
        self.read_header_u16(ARCOUNT)
    }

    // Counts only move together with content, see `Message::add_question`
    // and `Message::add_resource_record`.
    pub(super) fn bump_qdcount(&mut self) {
        self.write_header_u16(QDCOUNT, self.get_qdcount().wrapping_add(1));
    }

    pub(super) fn bump_ancount(&mut self) {
        self.write_header_u16(ANCOUNT, self.get_ancount().wrapping_add(1));
    }

    pub(super) fn bump_nscount(&mut self) {
        self.write_header_u16(NSCOUNT, self.get_nscount().wrapping_add(1));
    }

    pub(super) fn bump_arcount(&mut self) {
        self.write_header_u16(ARCOUNT, self.get_arcount().wrapping_add(1));
    }

    fn set_flag(&mut self, byte: usize, mask: u8, on: bool) {
        if on {
            self.buf[byte] |= mask;
        } else {
            self.buf[byte] &= !mask;
        }
    }

    fn read_header_u16(&self, at: usize) -> u16 {
        u16::from_be_bytes([self.buf[at], self.buf[at + 1]])
    }

    fn write_header_u16(&mut self, at: usize, value: u16) {
        self.buf[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }
}

/// Human-readable text for a response code.
pub fn rcode_message(rcode: u8) -> &'static str {
    match rcode {
        0 => "No error",
        1 => "Format error",
        2 => "Server failure",
        3 => "Name error (name does not exist)",
        4 => "Not implemented (parameters not supported)",
        5 => "Refused",
        _ => "Invalid error message",
    }
}
