//! Transition-posterior engine.
//!
//! Converts raw per-block transition log-weights into row-normalized
//! transition posteriors via a log-space forward pass followed by a
//! log-space backward pass, both in the max-semiring (this is a Viterbi
//! posterior, not a Baum–Welch sum-posterior — see the crate docs).

use crate::error::{Error, Result};
use crate::logspace::logsumexp;
use crate::matrix::Matrix;
use crate::recurrence;
use crate::state::{decode_trans_index, nbase_from_nstate};

/// Compute row-normalized transition posteriors from raw transition
/// log-weights.
///
/// When `want_log` is `false`, the returned matrix holds posterior
/// probabilities (the log values exponentiated in place) rather than log
/// posteriors.
///
/// # Errors
/// Returns [`Error::InvalidStateCount`] if `logprob`'s column count is not
/// `2*B*(B+1)` for any positive integer `B`.
pub fn compute_transition_posteriors(logprob: &Matrix, want_log: bool) -> Result<Matrix> {
    let nbase = nbase_from_nstate(logprob.cols())?;
    let nstate = 2 * nbase;
    let nblocks = logprob.rows();
    let ntrans = logprob.cols();

    // Forward pass: fwd[0,.] = 0, retained for every block (the backward
    // pass below needs fwd at every prefix length, not just the last one).
    let mut fwd: Vec<Vec<f32>> = Vec::with_capacity(nblocks + 1);
    fwd.push(vec![0.0f32; nstate]);
    for k in 0..nblocks {
        let (scores, _pred) = recurrence::step(&fwd[k], logprob.row(k), nbase);
        fwd.push(scores);
    }

    let mut tpost = Matrix::zeros(nblocks, ntrans);

    // Backward pass: bwd[nblocks,.] = 0 (no cost-to-go once every block has
    // been consumed), symmetric to fwd[0,.] = 0.
    let mut bwd = vec![0.0f32; nstate];
    for k in (1..=nblocks).rev() {
        let row = logprob.row(k - 1);
        let out_row = tpost.row_mut(k - 1);
        for (c, out) in out_row.iter_mut().enumerate() {
            let (from, to) = decode_trans_index(c, nbase);
            *out = fwd[k - 1][from] + bwd[to] + row[c];
        }

        // Roll bwd back one block: for each source state, the best of its
        // B+1 outgoing edges (B flip moves plus one flop edge).
        let mut new_bwd = vec![f32::NEG_INFINITY; nstate];
        for from in 0..nstate {
            let mut best = f32::NEG_INFINITY;
            for to in 0..nbase {
                let cand = row[to * nstate + from] + bwd[to];
                if cand > best {
                    best = cand;
                }
            }
            let flop_to = if from < nbase { from + nbase } else { from };
            let flop_col = nstate * nbase + from;
            let cand = row[flop_col] + bwd[flop_to];
            if cand > best {
                best = cand;
            }
            new_bwd[from] = best;
        }
        bwd = new_bwd;
    }

    // Row normalization.
    for k in 0..nblocks {
        let row = tpost.row_mut(k);
        let norm = logsumexp(row);
        for v in row.iter_mut() {
            *v -= norm;
        }
    }

    if !want_log {
        let exp: Vec<f32> = tpost.into_vec().into_iter().map(f32::exp).collect();
        return Ok(Matrix::from_vec(nblocks, ntrans, exp));
    }

    Ok(tpost)
}
