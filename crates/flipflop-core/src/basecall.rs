//! Path-to-basecall reducer.
//!
//! Run-length encodes a decoded flip-flop state path (as produced by
//! [`crate::viterbi::viterbi_decode`]) into a basecall string, a per-run
//! block-index alignment, and an optional modification-score table.
//!
//! Runs are delimited by *exact* equality of adjacent path entries, not by
//! canonical base equality: a flip -> flop switch between two occurrences of
//! the same letter (a homopolymer) still starts a new run, since that switch
//! is how the flip-flop encoding represents "the same base again" rather
//! than "stay on this base".

use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Run-length encode `path` by adjacent equality.
///
/// Returns `(run_value, run_len)`, parallel vectors over the runs.
#[must_use]
pub fn run_length_encode(path: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut run_value = Vec::new();
    let mut run_len = Vec::new();
    let mut iter = path.iter();
    let Some(&first) = iter.next() else {
        return (run_value, run_len);
    };
    let mut cur = first;
    let mut len = 1usize;
    for &v in iter {
        if v == cur {
            len += 1;
        } else {
            run_value.push(cur);
            run_len.push(len);
            cur = v;
            len = 1;
        }
    }
    run_value.push(cur);
    run_len.push(len);
    (run_value, run_len)
}

/// Prefix-sum `[0] ++ run_len` into the block index at which each run begins.
#[must_use]
pub fn rl_cumsum(run_len: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(run_len.len() + 1);
    out.push(0);
    let mut acc = 0;
    for &l in run_len {
        acc += l;
        out.push(acc);
    }
    out
}

/// The full result of [`decode_posteriors`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The called sequence, one letter of `alphabet` per run.
    pub basecall: String,
    /// `max_d fwd[nblocks, d]`, the best-path score returned by the
    /// Viterbi decoder.
    pub score: f32,
    /// Block index at which each run begins; length `nruns + 1`.
    pub rl_cumsum: Vec<usize>,
    /// Per-run, per-modification log-weights, or `None` if no modification
    /// channel was supplied.
    pub mods_scores: Option<Matrix>,
}

/// Decode `r_post` (a transition-posterior matrix) end to end: run the
/// Viterbi decoder, run-length encode its path, map runs onto `alphabet`,
/// and optionally attach a modified-base score table.
///
/// `mod_weights` (when present) is a `[nblocks, Σ_b (1 + can_nmods[b])]`
/// matrix whose columns interleave, per canonical base, one canonical
/// channel followed by that base's modification channels; `can_nmods[b]`
/// gives the modification count for base `b`.
///
/// # Errors
/// Propagates [`crate::viterbi::viterbi_decode`]'s errors, plus
/// [`Error::AlphabetMismatch`] if `alphabet`'s length disagrees with the
/// base count inferred from `r_post`'s width.
pub fn decode_posteriors(
    r_post: &Matrix,
    alphabet: &str,
    mod_weights: Option<&Matrix>,
    can_nmods: Option<&[usize]>,
) -> Result<Decoded> {
    let nbase = crate::state::nbase_from_nstate(r_post.cols())?;
    let letters: Vec<char> = alphabet.chars().collect();
    if letters.len() != nbase {
        return Err(Error::AlphabetMismatch {
            alphabet_len: letters.len(),
            nbase,
        });
    }

    let mut path = Vec::new();
    let mut qpath = Vec::new();
    let score = crate::viterbi::viterbi_decode(r_post, &mut path, &mut qpath)?;

    let (run_value, run_len) = run_length_encode(&path);
    let cumsum = rl_cumsum(&run_len);
    let basecall: String = run_value.iter().map(|&v| letters[v % nbase]).collect();

    let mods_scores = match (mod_weights, can_nmods) {
        (Some(weights), Some(can_nmods)) => {
            Some(build_mods_scores(weights, can_nmods, &run_value, &cumsum, nbase)?)
        }
        _ => None,
    };

    Ok(Decoded {
        basecall,
        score,
        rl_cumsum: cumsum,
        mods_scores,
    })
}

fn build_mods_scores(
    weights: &Matrix,
    can_nmods: &[usize],
    run_value: &[usize],
    cumsum: &[usize],
    nbase: usize,
) -> Result<Matrix> {
    if can_nmods.len() != nbase {
        return Err(Error::AlphabetMismatch {
            alphabet_len: can_nmods.len(),
            nbase,
        });
    }
    let m_total: usize = can_nmods.iter().sum();
    let mut can_mods_offsets = vec![0usize; nbase + 1];
    for b in 0..nbase {
        can_mods_offsets[b + 1] = can_mods_offsets[b] + can_nmods[b];
    }
    let mut base_offset = vec![0usize; nbase];
    for b in 1..nbase {
        base_offset[b] = base_offset[b - 1] + 1 + can_nmods[b - 1];
    }

    let nruns = run_value.len();
    let mut scores = vec![f32::NAN; nruns * m_total];
    for r in 1..nruns {
        let b = run_value[r] % nbase;
        let block = cumsum[r] - 1;
        for j in 0..can_nmods[b] {
            let src_col = base_offset[b] + 1 + j;
            let dst_col = can_mods_offsets[b] + j;
            scores[r * m_total + dst_col] = weights.get(block, src_col);
        }
    }

    Ok(Matrix::from_vec(nruns, m_total, scores))
}
