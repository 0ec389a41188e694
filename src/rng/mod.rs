//! Deterministic random number generation
//!
//! Uses a seeded ChaCha8 stream for fast, deterministic random number
//! generation. CRITICAL: All randomness in the simulator MUST go through
//! this module.

mod chacha;

pub use chacha::SimRng;
