//! The flip/flop max-sum recurrence shared by the transition-posterior
//! forward pass and the Viterbi forward pass.
//!
//! Both components apply the *same* per-block update; they only differ in
//! whether the forward scores for every block are retained (for the
//! backward pass) or rolled over two rails (instead retaining a traceback
//! table). Factoring the update here keeps that one recurrence written
//! exactly once.

/// Apply one block of the flip/flop max-sum recurrence.
///
/// `prev` holds the forward score for every state before this block; `row`
/// is the block's transition-weight row (`logprob` or `tpost`, length
/// `2*nbase*(nbase+1)`). Returns the new forward scores together with, for
/// each destination state, the predecessor state that attained the maximum
/// (argmax, ties broken to the smaller state index per the crate's general
/// numerical discipline).
#[must_use]
pub fn step(prev: &[f32], row: &[f32], nbase: usize) -> (Vec<f32>, Vec<usize>) {
    let nstate = 2 * nbase;
    let mut out = vec![f32::NEG_INFINITY; nstate];
    let mut pred = vec![0usize; nstate];

    // Flip destinations: full max over every source state.
    for d in 0..nbase {
        let mut best = f32::NEG_INFINITY;
        let mut best_s = 0usize;
        for (s, &weight) in row[d * nstate..d * nstate + nstate].iter().enumerate() {
            let cand = prev[s] + weight;
            if cand > best {
                best = cand;
                best_s = s;
            }
        }
        out[d] = best;
        pred[d] = best_s;
    }

    // Flop destinations: exactly two candidate predecessors, smaller index
    // (the flip source `b`) evaluated first so it wins ties.
    let flip_block = nstate * nbase;
    for d in nbase..nstate {
        let b = d - nbase;
        let move_score = prev[b] + row[flip_block + b];
        let stay_score = prev[d] + row[flip_block + d];

        let (best, best_s) = if stay_score > move_score {
            (stay_score, d)
        } else {
            (move_score, b)
        };
        out[d] = best;
        pred[d] = best_s;
    }

    (out, pred)
}
