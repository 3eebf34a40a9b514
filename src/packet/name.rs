//! Domain name compression.
//!
//! Decoding records every offset at which a name (or name suffix) starts so
//! later pointers can be resolved without walking the buffer again.
//! Encoding records the offset of every suffix it writes so that a later
//! occurrence of exactly the same suffix becomes a two-byte pointer.
//!
//! Names are handled in presentation form: labels joined by `.`, with a
//! `.` or `\` inside a label escaped by a backslash.

use super::{Error, Message, Result};

const POINTER_TAG: u8 = 0b1100_0000;
const MAX_POINTER: usize = 0x3fff;
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;

impl Message {
    /// Decodes the name starting at the cursor and leaves the cursor just
    /// past it.
    ///
    /// A compression pointer must refer strictly backward to an offset at
    /// which a name has already been decoded (or written) in this message;
    /// anything else is reported as [`Error::MalformedPointer`]. Label bytes
    /// that aren't UTF-8 are replaced with U+FFFD, so such names don't
    /// re-encode byte for byte.
    pub fn get_name(&mut self) -> Result<String> {
        let mut labels: Vec<(usize, String)> = Vec::new();

        let suffix = loop {
            let start = self.cursor;
            let len = self.read_u8()?;
            if len == 0 {
                break String::new();
            }

            match len & POINTER_TAG {
                0 => {
                    let bytes = self.take(len as usize)?;
                    labels.push((start, escape(&String::from_utf8_lossy(bytes))));
                }
                POINTER_TAG => {
                    let low = self.read_u8()?;
                    let target = (((len & !POINTER_TAG) as usize) << 8) | low as usize;
                    let suffix = match self.names_by_pos.get(&target) {
                        Some(name) if target < start => name.clone(),
                        _ => return Err(Error::MalformedPointer { offset: start, target }),
                    };
                    self.names_by_pos.insert(start, suffix.clone());
                    break suffix;
                }
                _ => return Err(Error::ReservedLabelType { offset: start, byte: len }),
            }
        };

        let mut name = suffix;
        for (start, label) in labels.into_iter().rev() {
            name = if name.is_empty() {
                label
            } else {
                format!("{label}.{name}")
            };
            self.names_by_pos.insert(start, name.clone());
        }

        Ok(name)
    }

    /// Appends `name` at the cursor, compressing it against names already
    /// written to this message. On failure nothing is written.
    pub fn add_name(&mut self, name: &str) -> Result<()> {
        self.append(|msg| msg.write_name(name))
    }

    pub(super) fn write_name(&mut self, name: &str) -> Result<()> {
        let name = strip_root(name);
        let labels = split(name);
        validate(name, &labels)?;

        for (suffix, label) in labels {
            let at = self.cursor;

            if let Some(&target) = self.pos_by_name.get(suffix) {
                self.put_u16(0xc000 | target as u16)?;
                self.names_by_pos.insert(at, suffix.to_owned());
                return Ok(());
            }

            self.put_u8(label.len() as u8)?;
            self.put(label.as_bytes())?;

            if at <= MAX_POINTER {
                self.pos_by_name.insert(suffix.to_owned(), at);
            }
            self.names_by_pos.insert(at, suffix.to_owned());
        }

        self.put_u8(0)
    }
}

fn escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c == '.' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Drops a final unescaped `.`.
fn strip_root(name: &str) -> &str {
    match name.strip_suffix('.') {
        Some(rest) if rest.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0 => rest,
        _ => name,
    }
}

/// Splits a name into `(suffix, unescaped label)` pairs, one per label.
fn split(name: &str) -> Vec<(&str, String)> {
    let mut out = Vec::new();
    if name.is_empty() {
        return out;
    }

    let mut start = 0;
    let mut label = String::new();
    let mut chars = name.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '.' => {
                out.push((&name[start..], std::mem::take(&mut label)));
                start = i + 1;
            }
            '\\' => label.push(chars.next().map_or('\\', |(_, escaped)| escaped)),
            c => label.push(c),
        }
    }
    out.push((&name[start..], label));
    out
}

fn validate(name: &str, labels: &[(&str, String)]) -> Result<()> {
    let invalid = |reason| Error::InvalidName {
        name: name.to_owned(),
        reason,
    };

    let encoded: usize = labels.iter().map(|(_, label)| label.len() + 1).sum::<usize>() + 1;
    if encoded > MAX_NAME_LEN {
        return Err(invalid("name longer than 255 bytes"));
    }
    for (_, label) in labels {
        if label.is_empty() {
            return Err(invalid("empty label"));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(invalid("label longer than 63 bytes"));
        }
    }

    Ok(())
}

/// Presentation form of a decoded name; the root is shown as `.`.
pub(crate) fn display(name: &str) -> &str {
    if name.is_empty() {
        "."
    } else {
        name
    }
}
