//! # iamux
//!
//! **Encode-side assembly and validation for an immersive-audio OBU container.**
//!
//! ## Core Invariant
//!
//! > Every serialized OBU is **self-describing**: one flag-and-type byte, a
//! > leb128 `obu_size` covering everything after itself, then the staged
//! > header fields and payload. The staged bytes are measured **before** the
//! > size field is emitted; nothing is ever backpatched.
//!
//! ## What iamux Does
//!
//! - Encodes leb128 fields in minimal or fixed-width form ([`leb128`])
//! - Frames audio-frame and temporal-delimiter OBUs bit-exactly ([`obu`])
//! - Reconciles per-substream trim metadata to one common trim ([`trim`])
//! - Negotiates a common PCM output format and serializes PCM frames ([`pcm`])
//! - Deduplicates and cross-validates shared parameter definitions ([`param`])
//! - Merges measured/user loudness into mix presentations ([`mix_presentation`])
//!
//! ## What iamux Does NOT Do
//!
//! - ❌ Decode or demux a container
//! - ❌ Measure loudness (only the merge/finalize step lives here)
//! - ❌ Interpret codec payloads (substream bytes are opaque)
//! - ❌ Parse configuration or touch files; all I/O belongs to the caller
//!
//! Every operation is a pure function of its inputs plus a caller-owned
//! output buffer. Failures are synchronous and leave no usable partial
//! result.
//!
//! # Example
//!
//! ```
//! use iamux::leb128::LebGenerator;
//! use iamux::obu::{AudioFrameObu, ObuHeader};
//!
//! # fn main() -> iamux::Result<()> {
//! let obu = AudioFrameObu::new(ObuHeader::default(), 0, vec![42]);
//! let mut out = Vec::new();
//! obu.validate_and_write(&LebGenerator::minimal(), &mut out)?;
//! assert_eq!(out, [0x30, 0x01, 42]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod leb128;
pub mod obu;

pub mod param;
pub mod pcm;
pub mod trim;

pub mod mix_presentation;

// Invariant PPT testing framework
pub mod invariant_ppt;

pub use error::{Error, Result};
