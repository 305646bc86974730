//! Version-2 binary serialization format.
//!
//! ```text
//! MAGIC     : 4 bytes  = 'l', 0x05, 0x01, 0x04
//! VERSION   : LEB128   = 2
//! RULES*    : zero or more rule records
//! EOF_MARK  : 1 byte   = 0xFF
//!
//! rule record:
//!   NAME      : 4 UTF-8-encoded code points
//!   CONTS*    : zero or more continuation records
//!   RULE_END  : 2 bytes = 0x00 0x00
//!
//! continuation record:
//!   CHAR      : 1 UTF-8-encoded code point
//!   WEIGHT    : LEB128 unsigned, non-zero
//! ```
//!
//! `RULE_END` is unambiguous because a genuine continuation can never carry
//! WEIGHT=0. `EOF_MARK` (0xFF) is unambiguous where a NAME is expected
//! because 0xFF is never a valid UTF-8 lead byte. Load is streaming and
//! single-pass — the only lookahead it needs is a single peeked byte to
//! distinguish EOF_MARK from the start of a NAME.

use crate::error::Error;
use crate::leb128;
use crate::model::{Model, ModelConfig};
use crate::text::utf8;
use std::io::{Read, Write};

/// The 4-byte file magic.
pub const MAGIC: [u8; 4] = [b'l', 0x05, 0x01, 0x04];
/// The only format version this crate writes or understands.
pub const FORMAT_VERSION: u64 = 2;
/// Terminates the rule list.
pub const EOF_MARK: u8 = 0xFF;
/// Terminates one rule's continuation list.
pub const RULE_END: [u8; 2] = [0x00, 0x00];

/// Write `model` to `w` in the version-2 format.
pub fn save<W: Write>(model: &Model, w: &mut W) -> Result<(), Error> {
    w.write_all(&MAGIC)?;
    leb128::encode_to(FORMAT_VERSION, w)?;

    let mut rule_count = 0usize;
    for rule in model.table.iter_rules() {
        for &cp in &rule.name {
            let encoded = utf8::encode_one(cp)
                .ok_or(Error::CorruptRecord("rule name has an invalid code point"))?;
            w.write_all(encoded.as_bytes())?;
        }
        for cont in rule.continuations() {
            let encoded = utf8::encode_one(cont.ch).ok_or(Error::CorruptRecord(
                "continuation character is an invalid code point",
            ))?;
            w.write_all(encoded.as_bytes())?;
            leb128::encode_to(cont.weight as u64, w)?;
        }
        w.write_all(&RULE_END)?;
        rule_count += 1;
    }
    w.write_all(&[EOF_MARK])?;
    log::info!("saved model: {} rules", rule_count);
    Ok(())
}

fn read_codepoint_with_lead<R: Read>(lead: u8, r: &mut R) -> Result<u32, Error> {
    let len = utf8::sequence_length(lead).ok_or(Error::InvalidUtf8)?;
    let mut buf = [0u8; 4];
    buf[0] = lead;
    if len > 1 {
        r.read_exact(&mut buf[1..len]).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::TruncatedInput
            } else {
                Error::Io(e)
            }
        })?;
    }
    let (cp, consumed) = utf8::decode_one(&buf[..len]).map_err(|_| Error::InvalidUtf8)?;
    debug_assert_eq!(consumed, len);
    Ok(cp)
}

fn read_codepoint<R: Read>(r: &mut R) -> Result<u32, Error> {
    let mut lead = [0u8; 1];
    if r.read(&mut lead)? == 0 {
        return Err(Error::TruncatedInput);
    }
    read_codepoint_with_lead(lead[0], r)
}

/// Read a version-2 model from `r`, rehashing every rule into a fresh table
/// with `bucket_bits` buckets (the save format does not encode the source
/// model's bucket count, so the loader is free to choose its own).
pub fn load<R: Read>(r: R, bucket_bits: u32) -> Result<Model, Error> {
    load_with_config(r, ModelConfig::default().with_bucket_bits(bucket_bits))
}

/// Like [`load`], but the destination model is constructed from a
/// caller-supplied [`ModelConfig`] (for example to restore a specific PRNG
/// seed rather than the default).
pub fn load_with_config<R: Read>(mut r: R, config: ModelConfig) -> Result<Model, Error> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::TruncatedInput
        } else {
            Error::Io(e)
        }
    })?;
    if magic != MAGIC {
        return Err(Error::BadMagic);
    }
    let version = leb128::decode_from(&mut r)?;
    if version != FORMAT_VERSION {
        return Err(Error::BadVersion(version));
    }

    let mut model = Model::new(config)?;
    let mut rule_count = 0usize;
    loop {
        let mut first = [0u8; 1];
        if r.read(&mut first)? == 0 {
            return Err(Error::TruncatedInput);
        }
        if first[0] == EOF_MARK {
            break;
        }

        let mut name = [0u32; 4];
        name[0] = read_codepoint_with_lead(first[0], &mut r)?;
        for slot in &mut name[1..] {
            *slot = read_codepoint(&mut r)?;
        }
        if model.table.lookup(&name).is_some() {
            return Err(Error::CorruptRecord("duplicate rule name"));
        }
        let rule = model.table.lookup_or_create(name)?;

        loop {
            let ch = read_codepoint(&mut r)?;
            let weight = leb128::decode_from(&mut r)?;
            if weight == 0 {
                if ch == 0 {
                    break;
                }
                return Err(Error::CorruptRecord(
                    "zero weight paired with a nonzero character",
                ));
            }
            rule.add_weight(ch, weight.min(u32::MAX as u64) as u32)?;
        }
        rule_count += 1;
    }
    log::info!("loaded model: {} rules", rule_count);
    Ok(model)
}

impl Model {
    /// Write this model to `w` in the version-2 binary format.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        save(self, w)
    }

    /// Read a model from `r`, rehashed into a table with `bucket_bits`
    /// buckets.
    pub fn load<R: Read>(r: R, bucket_bits: u32) -> Result<Model, Error> {
        load(r, bucket_bits)
    }

    /// Read a model from `r` into a table built from `config` (for example
    /// to restore a specific PRNG seed rather than the default).
    pub fn load_with_config<R: Read>(r: R, config: ModelConfig) -> Result<Model, Error> {
        load_with_config(r, config)
    }
}
