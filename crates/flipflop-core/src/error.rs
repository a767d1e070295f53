//! Structured error taxonomy for the flip-flop CRF core.
//!
//! Every public operation returns a [`Result`] instead of panicking on bad
//! input; callers are expected to handle these programmatically rather than
//! by matching on message text. Nothing in this module logs or otherwise
//! performs I/O — see the crate-level docs for why.

use thiserror::Error;

/// Errors produced by the public operations of this crate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Transition-column width is not `2*B*(B+1)` for any positive integer `B`.
    #[error("transition width {width} is not 2*B*(B+1) for any positive integer B")]
    InvalidStateCount {
        /// The offending column count.
        width: usize,
    },

    /// Alphabet length disagrees with the base count inferred from matrix width.
    #[error("alphabet length {alphabet_len} does not match the inferred base count {nbase}")]
    AlphabetMismatch {
        /// Length of the caller-supplied alphabet string.
        alphabet_len: usize,
        /// Base count inferred from the posterior matrix width.
        nbase: usize,
    },

    /// Zero blocks or a zero-length sequence where one is required.
    #[error("empty input: {reason}")]
    EmptyInput {
        /// Which operation/argument was empty.
        reason: &'static str,
    },

    /// The scoring window would be empty: `nblk < nseq - 1`.
    #[error(
        "insufficient blocks for scoring: nblk={nblk}, nseq={nseq} (window width would be {window})"
    )]
    InsufficientBlocks {
        /// Number of posterior rows made available to the scorer.
        nblk: usize,
        /// Length of the proposed sequence.
        nseq: usize,
        /// The window width that would result (`nblk - nseq + 2`), possibly negative.
        window: i64,
    },

    /// `tpost_start`/`tpost_end` fall outside the posterior matrix bounds.
    #[error(
        "range out of bounds: tpost_start={tpost_start}, tpost_end={tpost_end}, nblocks_total={nblocks_total}"
    )]
    RangeOutOfBounds {
        /// Requested start row (inclusive).
        tpost_start: usize,
        /// Requested end row (exclusive).
        tpost_end: usize,
        /// Total rows available in the posterior matrix.
        nblocks_total: usize,
    },

    /// `seq[i] >= B`, or `mod_cats[i] >= can_nmods[seq[i]]`.
    #[error("invalid symbol at position {pos}: value {value} is out of bounds (limit {bound})")]
    InvalidSymbol {
        /// Index into `seq` or `mod_cats` where the violation occurred.
        pos: usize,
        /// The offending value.
        value: usize,
        /// The exclusive upper bound the value was expected to respect.
        bound: usize,
    },
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = core::result::Result<T, Error>;
