//! # tetragram
//!
//! A trainable 4th-order character-level Markov model over Unicode code
//! points: train it on UTF-8 text, it accumulates transition-frequency
//! statistics keyed by 4-character sliding contexts, and samples from those
//! statistics to generate new text or to persist/restore the model to a
//! compact binary format.
//!
//! ## Module Organization
//!
//! - [`model`] - the public facade: [`Model`] and [`ModelConfig`]
//! - [`table`] - the chained hash table a model's statistics live in
//! - [`sample`] - the weighted-sampling walk over one context's continuations
//! - [`rng`] - the pluggable PRNG contract, plus the built-in [`rng::PcgRng`]
//! - [`text`] - a single-code-point UTF-8 codec
//! - [`leb128`] - the unsigned varint codec used by the binary format
//! - [`binary`] - the versioned save/load format (requires the `std` feature)
//! - [`error`] - the crate-wide [`Error`] type
//!
//! ## Quick Start
//!
//! ```
//! use tetragram::{Model, ModelConfig};
//!
//! let mut model = Model::new(ModelConfig::default().with_seed(0xB00B)).unwrap();
//! model.train_str("Grzegorz Brzęczyszczykiewicz.").unwrap();
//! let generated = model.generate(40);
//! assert!(generated.chars().count() <= 40);
//! ```
//!
//! ## Features
//!
//! - `std` (default) - enables [`binary`] save/load and `std::error::Error`
//! - `serde` - `Serialize`/`Deserialize` for [`model::ModelConfig`]
//! - `rand-backend` - an [`rng::Rng`] adapter over the `rand` ecosystem
//! - `cli` - builds the `tetragram` example binary

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

// =============================================================================
// Core modules
// =============================================================================

/// Crate-wide error type.
pub mod error;

/// The pluggable PRNG contract, plus the built-in PCG32 implementation.
pub mod rng;

/// Unsigned LEB128 variable-length integer codec.
pub mod leb128;

/// Single-code-point UTF-8 encode/decode.
pub mod text;

/// The weighted-sampling walk over one context's continuations.
pub(crate) mod sample;

/// The chained hash table mapping a context to its observed continuations.
pub mod table;

/// The public model facade: construction, training, sampling, generation.
pub mod model;

/// Versioned binary serialization of a [`Model`].
#[cfg(feature = "std")]
pub mod binary;

// =============================================================================
// Public re-exports
// =============================================================================

pub use error::Error;
pub use model::{Model, ModelConfig, DEFAULT_BUCKET_BITS};
pub use rng::{PcgRng, Rng};
pub use table::{Continuation, ContextTable, Rule};
