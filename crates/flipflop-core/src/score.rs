//! Sequence scorer.
//!
//! Dynamic programming over a `(sequence-position x window-offset)` lattice
//! that measures how well a proposed symbol sequence agrees with a segment
//! of a transition-posterior matrix, in either the max-sum ("best path") or
//! log-sum-exp ("all paths") semiring, with an optional modified-base
//! channel folded into the step score.

use crate::error::{Error, Result};
use crate::logspace::logsumexp2;
use crate::matrix::Matrix;
use crate::state::{nbase_from_nstate, stay_step_indices};

/// Optional modified-base channel for [`score_mod_sequence`].
struct ModChannel<'a> {
    mod_cats: &'a [usize],
    can_mods_offsets: &'a [usize],
    ntrans: usize,
}

fn combine(a: f32, b: f32, all_paths: bool) -> f32 {
    if all_paths {
        logsumexp2(a, b)
    } else {
        a.max(b)
    }
}

fn validate_window(nblk: usize, nseq: usize) -> Result<usize> {
    if nseq == 0 {
        return Err(Error::EmptyInput {
            reason: "score_sequence requires a non-empty seq",
        });
    }
    let window = nblk as i64 - nseq as i64 + 2;
    if window < 1 {
        return Err(Error::InsufficientBlocks {
            nblk,
            nseq,
            window,
        });
    }
    Ok(window as usize)
}

fn validate_range(tpost_start: usize, tpost_end: usize, nblocks_total: usize) -> Result<()> {
    if tpost_start > tpost_end || tpost_end > nblocks_total {
        return Err(Error::RangeOutOfBounds {
            tpost_start,
            tpost_end,
            nblocks_total,
        });
    }
    Ok(())
}

fn validate_seq(seq: &[usize], nbase: usize, mods: Option<&ModChannel<'_>>) -> Result<()> {
    for (i, &s) in seq.iter().enumerate() {
        if s >= nbase {
            return Err(Error::InvalidSymbol {
                pos: i,
                value: s,
                bound: nbase,
            });
        }
    }
    if let Some(m) = mods {
        for (i, &c) in m.mod_cats.iter().enumerate() {
            let bound = m.can_mods_offsets[seq[i] + 1] - m.can_mods_offsets[seq[i]];
            if c >= bound {
                return Err(Error::InvalidSymbol {
                    pos: i,
                    value: c,
                    bound,
                });
            }
        }
    }
    Ok(())
}

/// Core lattice DP shared by [`score_sequence`] and [`score_mod_sequence`].
fn score_inner(
    tpost: &Matrix,
    seq: &[usize],
    tpost_start: usize,
    tpost_end: usize,
    all_paths: bool,
    nbase: usize,
    mods: Option<ModChannel<'_>>,
) -> Result<f32> {
    validate_range(tpost_start, tpost_end, tpost.rows())?;
    let nblk = tpost_end - tpost_start;
    let nseq = seq.len();
    let w_len = validate_window(nblk, nseq)?;
    validate_seq(seq, nbase, mods.as_ref())?;

    let (stay, step) = stay_step_indices(seq, nbase);

    let mod_extra = |i: usize, block: usize| -> f32 {
        match &mods {
            Some(m) => {
                let b = seq[i];
                let col = m.ntrans + m.can_mods_offsets[b] + m.mod_cats[i];
                tpost.get(block, col)
            }
            None => 0.0,
        }
    };

    // Row i=0: all stays for the first symbol.
    let mut prev = vec![f32::NEG_INFINITY; w_len];
    prev[0] = 0.0;
    for w in 1..w_len {
        let block = tpost_start + w - 1;
        prev[w] = prev[w - 1] + tpost.get(block, stay[0]);
    }

    let mut curr = vec![f32::NEG_INFINITY; w_len];
    for i in 1..nseq {
        for w in 0..w_len {
            let block = tpost_start + i + w - 1;
            let step_score = prev[w] + tpost.get(block, step[i - 1]) + mod_extra(i, block);
            curr[w] = if w == 0 {
                step_score
            } else {
                let stay_score = curr[w - 1] + tpost.get(block, stay[i]);
                combine(step_score, stay_score, all_paths)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    Ok(prev[w_len - 1])
}

/// Score how well `seq` agrees with `tpost[tpost_start..tpost_end, ·]`.
///
/// `all_paths = false` computes the best-path (max-sum) score; `true`
/// computes the log-sum-exp over every alignment in the lattice.
///
/// # Errors
/// See the crate's [`Error`] variants: `EmptyInput`, `InsufficientBlocks`,
/// `RangeOutOfBounds`, `InvalidSymbol`, `InvalidStateCount`.
pub fn score_sequence(
    tpost: &Matrix,
    seq: &[usize],
    tpost_start: usize,
    tpost_end: usize,
    all_paths: bool,
) -> Result<f32> {
    let nbase = nbase_from_nstate(tpost.cols())?;
    score_inner(tpost, seq, tpost_start, tpost_end, all_paths, nbase, None)
}

/// Companion to [`score_sequence`] that folds a modified-base log-weight
/// channel into every step transition.
///
/// `can_mods_offsets` has length `B + 1` (a prefix sum of per-base
/// modification counts, `can_mods_offsets[B] = M`); `B` is taken from
/// `can_mods_offsets.len() - 1` rather than inferred from `tpost`'s width,
/// since the modified-base matrix width is `T + M`, not `2*B*(B+1)`.
///
/// # Errors
/// As [`score_sequence`], plus `InvalidSymbol` when a modification category
/// exceeds the base's modification count.
pub fn score_mod_sequence(
    tpost: &Matrix,
    seq: &[usize],
    mod_cats: &[usize],
    can_mods_offsets: &[usize],
    tpost_start: usize,
    tpost_end: usize,
    all_paths: bool,
) -> Result<f32> {
    if can_mods_offsets.is_empty() {
        return Err(Error::EmptyInput {
            reason: "can_mods_offsets must have length B + 1",
        });
    }
    let nbase = can_mods_offsets.len() - 1;
    let m_total = can_mods_offsets[nbase];
    let ntrans = 2 * nbase * (nbase + 1);
    if tpost.cols() != ntrans + m_total {
        return Err(Error::InvalidStateCount {
            width: tpost.cols(),
        });
    }
    let mods = ModChannel {
        mod_cats,
        can_mods_offsets,
        ntrans,
    };
    score_inner(
        tpost,
        seq,
        tpost_start,
        tpost_end,
        all_paths,
        nbase,
        Some(mods),
    )
}
