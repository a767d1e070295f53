//! Viterbi decoder.
//!
//! Max-sum forward pass with a traceback table over transition posteriors,
//! producing the single best state path and a per-step quality score.

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::recurrence;
use crate::state::{nbase_from_nstate, trans_index};

/// Decode the single best state path through `tpost`.
///
/// `path` and `qpath` are caller-owned output buffers; both are resized to
/// `nblocks + 1` and fully overwritten. `qpath[0]` is always `NaN` (there is
/// no transition leading into the first state).
///
/// Returns the best final score, `max_d fwd[nblocks, d]`.
///
/// # Errors
/// Returns [`Error::EmptyInput`] if `tpost` has zero rows, or
/// [`Error::InvalidStateCount`] if its column count is not `2*B*(B+1)`.
pub fn viterbi_decode(tpost: &Matrix, path: &mut Vec<usize>, qpath: &mut Vec<f32>) -> Result<f32> {
    let nblocks = tpost.rows();
    if nblocks == 0 {
        return Err(Error::EmptyInput {
            reason: "viterbi_decode requires at least one block",
        });
    }
    let nbase = nbase_from_nstate(tpost.cols())?;
    let nstate = 2 * nbase;

    let mut prev = vec![0.0f32; nstate];
    let mut tb: Vec<Vec<usize>> = Vec::with_capacity(nblocks);

    for k in 0..nblocks {
        let (curr, pred) = recurrence::step(&prev, tpost.row(k), nbase);
        tb.push(pred);
        prev = curr;
    }

    // Best final state: strict '>' so ties resolve to the smaller index.
    let mut best_score = f32::NEG_INFINITY;
    let mut best_state = 0usize;
    for (d, &score) in prev.iter().enumerate() {
        if score > best_score {
            best_score = score;
            best_state = d;
        }
    }

    path.clear();
    path.resize(nblocks + 1, 0);
    path[nblocks] = best_state;
    for k in (1..=nblocks).rev() {
        path[k - 1] = tb[k - 1][path[k]];
    }

    qpath.clear();
    qpath.resize(nblocks + 1, 0.0);
    qpath[0] = f32::NAN;
    for k in 1..=nblocks {
        let col = trans_index(path[k - 1], path[k], nbase);
        qpath[k] = tpost.get(k - 1, col);
    }

    Ok(best_score)
}
