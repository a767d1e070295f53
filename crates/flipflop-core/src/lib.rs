// crates/flipflop-core/src/lib.rs

//! A pure, synchronous flip-flop CRF decoding core.
//!
//! This crate turns per-block transition log-weights into row-normalized
//! transition posteriors, decodes the single best state path through them
//! (Viterbi, max-semiring), scores arbitrary candidate sequences against a
//! posterior window, and reduces a decoded path into a basecall. Every
//! operation is a pure function over caller-owned buffers: no I/O, no
//! logging, no global state. See [`error`] for the failure taxonomy and
//! [`state`] for the transition-index layout every other module depends on.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod basecall;
pub mod error;
pub mod logspace;
pub mod matrix;
pub mod posterior;
pub mod recurrence;
pub mod score;
pub mod state;
pub mod viterbi;

pub use basecall::{decode_posteriors, rl_cumsum, run_length_encode, Decoded};
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use posterior::compute_transition_posteriors;
pub use score::{score_mod_sequence, score_sequence};
pub use state::{flip_mask_walk, nbase_from_nstate, stay_step_indices, trans_index};
pub use viterbi::viterbi_decode;
