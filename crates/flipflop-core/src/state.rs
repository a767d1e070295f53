//! State-space utilities.
//!
//! Pure arithmetic mapping between base count, flip-flop state count, and the
//! transition-index layout. Every other component builds on the formulas
//! here; the layout is a contract with the upstream weight producer and must
//! not be "simplified" away from the exact indices below.

use crate::error::{Error, Result};

/// Recover the canonical base count `B` from a transition-column width.
///
/// Solves `n = 2*B*(B+1)` for the positive integer root of
/// `B^2 + B - n/2 = 0`, i.e. `B = floor(sqrt(0.25 + n/2) - 0.5)`, then
/// checks the candidate exactly (the floating-point solve is only a guess).
///
/// # Errors
/// Returns [`Error::InvalidStateCount`] if no positive integer `B` satisfies
/// `2*B*(B+1) == n`.
pub fn nbase_from_nstate(n: usize) -> Result<usize> {
    if n == 0 {
        return Err(Error::InvalidStateCount { width: n });
    }
    let nf = n as f64;
    let candidate = (0.25 + nf / 2.0).sqrt() - 0.5;
    // Check the floor candidate and its neighbor to absorb floating error.
    let base = candidate.floor().max(0.0) as usize;
    for b in [base.saturating_sub(1), base, base + 1, base + 2] {
        if b > 0 && 2 * b * (b + 1) == n {
            return Ok(b);
        }
    }
    Err(Error::InvalidStateCount { width: n })
}

/// Compute the transition-column index for a `(from, to)` state pair.
///
/// - Flip destinations (`to < nbase`) expand fully: `to*2*nbase + from`.
/// - Flop destinations (`to >= nbase`) share a column block of width
///   `2*nbase` addressed purely by `from`: `2*nbase*nbase + from`.
///
/// Callers are expected to only pass reachable `(from, to)` pairs (see
/// [`decode_trans_index`] for the inverse); this function does not validate
/// reachability, matching the forward formula of the layout contract.
#[inline]
#[must_use]
pub fn trans_index(from: usize, to: usize, nbase: usize) -> usize {
    let nstate = 2 * nbase;
    if to < nbase {
        to * nstate + from
    } else {
        nstate * nbase + from
    }
}

/// Inverse of [`trans_index`]: recover the `(from, to)` pair a transition
/// column encodes.
///
/// Used internally by the backward pass of the transition-posterior engine,
/// which must walk every column of a block and know which states it
/// connects.
#[inline]
#[must_use]
pub fn decode_trans_index(col: usize, nbase: usize) -> (usize, usize) {
    let nstate = 2 * nbase;
    let flip_block = nstate * nbase;
    if col < flip_block {
        (col % nstate, col / nstate)
    } else {
        let from = col - flip_block;
        let to = if from < nbase { from + nbase } else { from };
        (from, to)
    }
}

/// Apply the flip-mask walk: assign a flip or flop role to each position of
/// a canonical symbol sequence so that consecutive equal symbols alternate
/// roles.
///
/// `fm[0] = seq[0]`; `fm[i] = seq[i] + nbase` if `seq[i] == fm[i-1]`,
/// otherwise `fm[i] = seq[i]`.
#[must_use]
pub fn flip_mask_walk(seq: &[usize], nbase: usize) -> Vec<usize> {
    let mut fm = Vec::with_capacity(seq.len());
    let mut prev: Option<usize> = None;
    for &s in seq {
        let state = match prev {
            Some(p) if s == p => s + nbase,
            _ => s,
        };
        fm.push(state);
        prev = Some(state);
    }
    fm
}

/// Derive the `stay`/`step` transition-column arrays used by the sequence
/// scorer from a flip-mask walk.
///
/// `stay[i]` is the self-transition column that keeps the walk in its
/// current role at position `i`; `step[i-1]` is the column for advancing
/// from position `i-1` to `i`. `step` has one fewer entry than `stay`.
#[must_use]
pub fn stay_step_indices(seq: &[usize], nbase: usize) -> (Vec<usize>, Vec<usize>) {
    let fm = flip_mask_walk(seq, nbase);
    let stay: Vec<usize> = fm.iter().map(|&s| trans_index(s, s, nbase)).collect();
    let step: Vec<usize> = fm
        .windows(2)
        .map(|w| trans_index(w[0], w[1], nbase))
        .collect();
    (stay, step)
}
