//! The Markov model facade: construction, training, sampling, generation.
//!
//! This is the crate's single public entry point. Internally it owns a
//! [`ContextTable`] and an [`Rng`]; callers never touch those types
//! directly.

use crate::error::Error;
use crate::rng::{PcgRng, Rng};
use crate::sample;
use crate::table::ContextTable;
use crate::text::utf8;
use alloc::boxed::Box;
use alloc::string::String;

/// Bucket-bits default used when a [`ModelConfig`] doesn't specify one.
pub const DEFAULT_BUCKET_BITS: u32 = 16;

/// Construction parameters for a [`Model`].
///
/// Build one with `ModelConfig::default()` and the `with_*` setters, in the
/// same builder style as this corpus's other configuration structs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelConfig {
    /// `log2` of the number of hash buckets in the context table. Must be in
    /// `[1, 24]`.
    pub bucket_bits: u32,
    /// Seed for the built-in [`PcgRng`], used only if `rng` is `None`.
    pub seed: u32,
    /// A caller-supplied PRNG, replacing the built-in default entirely.
    ///
    /// Never serialized: a trait object has no portable wire form, so a
    /// deserialized config always falls back to the built-in [`PcgRng`]
    /// seeded from `seed`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub rng: Option<Box<dyn Rng + Send>>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            bucket_bits: DEFAULT_BUCKET_BITS,
            seed: 0,
            rng: None,
        }
    }
}

impl ModelConfig {
    /// Set the bucket-bits (log2 bucket count).
    pub fn with_bucket_bits(mut self, bucket_bits: u32) -> Self {
        self.bucket_bits = bucket_bits;
        self
    }

    /// Set the seed for the default PRNG. Ignored if `with_rng` is also used.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Install a caller-supplied PRNG in place of the default [`PcgRng`].
    pub fn with_rng(mut self, rng: Box<dyn Rng + Send>) -> Self {
        self.rng = Some(rng);
        self
    }
}

/// A trainable 4th-order character-level Markov model.
///
/// Single-owner, not thread-safe: every operation that samples (`sample`,
/// `train`, `generate*`) mutates the PRNG state, so the API takes `&mut
/// self` even where it reads the table. Two independent `Model`s can run on
/// separate threads — `Model` is `Send` ([`Rng`] requires `Send`) — but one
/// `Model` cannot be shared across threads without external synchronization
/// (it is `Send` but not `Sync`).
pub struct Model {
    pub(crate) table: ContextTable,
    rng: Box<dyn Rng + Send>,
}

impl Model {
    /// Create an empty model per `config`.
    pub fn new(config: ModelConfig) -> Result<Self, Error> {
        let table = ContextTable::new(config.bucket_bits)?;
        let rng = config
            .rng
            .unwrap_or_else(|| Box::new(PcgRng::new(config.seed)));
        Ok(Self { table, rng })
    }

    /// Record one observation: `ch` followed `name`.
    pub fn associate(&mut self, name: [u32; 4], ch: u32) -> Result<(), Error> {
        let rule = self.table.lookup_or_create(name)?;
        rule.associate(ch)?;
        log::trace!(
            "associate name={:?} ch={} weight_total={}",
            name,
            ch,
            rule.weight_total
        );
        Ok(())
    }

    /// Draw a continuation character for `name` (0 if the context is
    /// unknown or sampling lands on end-of-string).
    pub fn sample(&mut self, name: [u32; 4]) -> u32 {
        let rule = self.table.lookup(&name);
        sample::sample(rule, self.rng.as_mut())
    }

    /// Train on a byte sequence, skipping invalid UTF-8 one byte at a time.
    ///
    /// Slides a 4-code-point window over the decoded text, associating each
    /// decoded character with the window that preceded it, then records an
    /// end-of-string transition from the final window.
    pub fn train(&mut self, input: &[u8]) -> Result<(), Error> {
        let mut window = [0u32; 4];
        let mut pos = 0;
        while pos < input.len() {
            match utf8::decode_one(&input[pos..]) {
                Ok((ch, n)) => {
                    self.associate(window, ch)?;
                    window = [window[1], window[2], window[3], ch];
                    pos += n;
                }
                Err(_) => {
                    log::debug!("train: skipping invalid byte at offset {}", pos);
                    pos += 1;
                }
            }
        }
        self.associate(window, 0)
    }

    /// Convenience wrapper for already-valid UTF-8 text.
    pub fn train_str(&mut self, text: &str) -> Result<(), Error> {
        self.train(text.as_bytes())
    }

    /// Generate a string of at most `max_chars` code points, stopping early
    /// at end-of-string.
    pub fn generate(&mut self, max_chars: usize) -> String {
        let mut window = [0u32; 4];
        let mut out = String::new();
        for _ in 0..max_chars {
            let ch = self.sample(window);
            if ch == 0 {
                break;
            }
            match char::from_u32(ch) {
                Some(c) => out.push(c),
                // Surrogate or out-of-range: never reaches output.
                None => break,
            }
            window = [window[1], window[2], window[3], ch];
        }
        out
    }

    /// Generate into a fixed byte buffer, NUL-terminated, matching the
    /// original system's fixed-buffer generation entry point.
    ///
    /// Stops (without writing a partial multi-byte sequence) if the next
    /// code point's encoding plus the trailing NUL would not fit. Returns
    /// the number of content bytes written, not counting the NUL. `buf`
    /// must have at least 1 byte of capacity.
    pub fn generate_into(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        let mut window = [0u32; 4];
        let mut pos = 0;
        loop {
            let ch = self.sample(window);
            if ch == 0 {
                break;
            }
            let encoded = match utf8::encode_one(ch) {
                Some(e) => e,
                None => break,
            };
            let bytes = encoded.as_bytes();
            if pos + bytes.len() + 1 > buf.len() {
                break;
            }
            buf[pos..pos + bytes.len()].copy_from_slice(bytes);
            pos += bytes.len();
            window = [window[1], window[2], window[3], ch];
        }
        buf[pos] = 0;
        pos
    }

    /// Number of distinct contexts observed so far.
    pub fn rule_count(&self) -> usize {
        self.table.rule_count()
    }

    /// Number of hash buckets (`2^bucket_bits`).
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// `bucket_bits` this model's table was constructed with.
    pub fn bucket_bits(&self) -> u32 {
        self.table.bucket_bits()
    }

    /// Approximate heap usage in bytes.
    pub fn heap_size(&self) -> usize {
        self.table.heap_size()
    }
}
