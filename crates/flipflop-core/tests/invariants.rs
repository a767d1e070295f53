//! Cross-module invariants for the transition-posterior engine, the Viterbi
//! decoder, and the sequence scorer.
//!
//! These tests treat:
//! - the transition-posterior engine as authoritative for row normalization
//!   (every row logsumexps to zero in log space), and
//! - the sequence scorer's best-path semiring as a brute-force-checkable
//!   maximum over the small set of alignments that exist for short windows.

use flipflop_core::{
    compute_transition_posteriors, flip_mask_walk, score_mod_sequence, score_sequence,
    stay_step_indices, trans_index, viterbi_decode, Matrix,
};
use proptest::prelude::*;

fn det_row(ntrans: usize, seed: u64) -> Vec<f32> {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1u64 << 32;
    let mut a = A.wrapping_mul(seed).wrapping_add(C);
    (0..ntrans)
        .map(|i| {
            a = a.wrapping_mul(A).wrapping_add(C) % M;
            let bits = a ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            ((bits % 4000) as f32) / 100.0 - 20.0
        })
        .collect()
}

fn det_matrix(nblocks: usize, ntrans: usize, seed: u64) -> Matrix {
    let mut data = Vec::with_capacity(nblocks * ntrans);
    for k in 0..nblocks {
        data.extend(det_row(ntrans, seed.wrapping_add(k as u64 * 7919)));
    }
    Matrix::from_vec(nblocks, ntrans, data)
}

/// Enumerate every valid alignment's path-sum for a scoring window, matching
/// the lattice's own stay/step legality, and return the max and the
/// logsumexp over all of them.
fn brute_force_score(tpost: &Matrix, seq: &[usize], nbase: usize) -> (f32, f32) {
    let (stay, step) = stay_step_indices(seq, nbase);
    let nblk = tpost.rows();
    let nseq = seq.len();
    let window = nblk as i64 - nseq as i64 + 2;
    assert!(window >= 1);

    // An alignment assigns to each sequence position i>=1 a number of extra
    // stay-blocks s_i >= 0 (for i=0, s_0 is the leading stay count), subject
    // to sum(s_i) + (nseq - 1) == nblk. Enumerate all such compositions by
    // recursive search (nblk, nseq are kept tiny in these tests).
    let mut sums = Vec::new();
    let mut alloc = vec![0i64; nseq];
    fn rec(
        pos: usize,
        remaining: i64,
        alloc: &mut Vec<i64>,
        tpost: &Matrix,
        stay: &[usize],
        step: &[usize],
        sums: &mut Vec<f32>,
    ) {
        if pos == alloc.len() {
            if remaining == 0 {
                // Replay the alignment to get its path sum.
                let mut block = 0usize;
                let mut sum = 0.0f32;
                for s in 0..alloc[0] {
                    sum += tpost.get(block, stay[0]);
                    block += 1;
                    let _ = s;
                }
                for i in 1..alloc.len() {
                    sum += tpost.get(block, step[i - 1]);
                    block += 1;
                    for _ in 0..alloc[i] {
                        sum += tpost.get(block, stay[i]);
                        block += 1;
                    }
                }
                sums.push(sum);
            }
            return;
        }
        let max_here = remaining;
        for v in 0..=max_here {
            alloc[pos] = v;
            rec(pos + 1, remaining - v, alloc, tpost, stay, step, sums);
        }
    }
    rec(
        0,
        tpost.rows() as i64 - (nseq as i64 - 1),
        &mut alloc,
        tpost,
        &stay,
        &step,
        &mut sums,
    );

    let best = sums.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let all = sums
        .iter()
        .fold(f32::NEG_INFINITY, |acc, &v| flipflop_core::logspace::logsumexp2(acc, v));
    (best, all)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// Every row of `compute_transition_posteriors(.., want_log=true)`
    /// logsumexps to (approximately) zero.
    #[test]
    fn posterior_rows_are_normalized(
        nbase in 1usize..=5,
        nblocks in 1usize..=6,
        seed in 0u64..10_000,
    ) {
        let ntrans = 2 * nbase * (nbase + 1);
        let logprob = det_matrix(nblocks, ntrans, seed);
        let tpost = compute_transition_posteriors(&logprob, true).unwrap();
        for k in 0..nblocks {
            let s = flipflop_core::logspace::logsumexp(tpost.row(k));
            prop_assert!(s.abs() < 1e-2, "row {k}: logsumexp={s}");
        }
    }

    /// `viterbi_decode` on posteriors that concentrate all mass on a
    /// single path recovers that path exactly.
    #[test]
    fn viterbi_recovers_planted_path(
        nbase in 1usize..=5,
        nblocks in 1usize..=8,
        seed in 0u64..10_000,
    ) {
        let ntrans = 2 * nbase * (nbase + 1);

        // Plant a path by an LCG walk that only ever takes a reachable step:
        // from any state, every flip destination (0..nbase) is reachable,
        // plus exactly one flop destination (the flip->flop move if `cur` is
        // a flip state, or the flop->flop stay if `cur` is already a flop
        // state).
        let mut a = seed.wrapping_mul(2_147_483_647).wrapping_add(12345);
        let mut path = vec![0usize; nblocks + 1];
        for k in 1..=nblocks {
            a = a.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let cur = path[k - 1];
            let idx = ((a >> 33) as usize) % (nbase + 1);
            path[k] = if idx < nbase {
                idx
            } else if cur < nbase {
                cur + nbase
            } else {
                cur
            };
        }

        let mut tpost = Matrix::zeros(nblocks, ntrans);
        for k in 0..nblocks {
            let row = tpost.row_mut(k);
            row.fill(-80.0);
            let col = trans_index(path[k], path[k + 1], nbase);
            row[col] = 0.0;
        }

        let mut got_path = Vec::new();
        let mut got_qpath = Vec::new();
        let _ = viterbi_decode(&tpost, &mut got_path, &mut got_qpath).unwrap();
        prop_assert_eq!(got_path, path);
    }

    /// The flip-mask walk never assigns the same raw state to two
    /// adjacent positions.
    #[test]
    fn flip_mask_walk_never_repeats_adjacent_state(
        nbase in 1usize..=5,
        seq in prop::collection::vec(0usize..5, 1..12),
    ) {
        let seq: Vec<usize> = seq.into_iter().map(|s| s % nbase).collect();
        let fm = flip_mask_walk(&seq, nbase);
        for w in fm.windows(2) {
            prop_assert_ne!(w[0], w[1]);
        }
        for (i, &s) in fm.iter().enumerate() {
            prop_assert_eq!(s % nbase, seq[i]);
        }
    }

    /// Best-path and all-paths scores match brute-force enumeration over
    /// every legal alignment, for small windows.
    #[test]
    fn score_matches_brute_force(
        nbase in 1usize..=3,
        nseq in 1usize..=3,
        extra_window in 0usize..3,
        seed in 0u64..10_000,
    ) {
        let ntrans = 2 * nbase * (nbase + 1);
        // nblk must be at least nseq - 1 for the window to be non-empty.
        let nblk = (nseq - 1) + extra_window.max(1);
        let seq: Vec<usize> = (0..nseq).map(|i| (seed as usize + i * 3) % nbase).collect();

        let tpost = det_matrix(nblk, ntrans, seed);

        let best = score_sequence(&tpost, &seq, 0, nblk, false).unwrap();
        let all = score_sequence(&tpost, &seq, 0, nblk, true).unwrap();
        let (bf_best, bf_all) = brute_force_score(&tpost, &seq, nbase);

        prop_assert!((best - bf_best).abs() < 1e-2, "best {best} vs brute {bf_best}");
        prop_assert!((all - bf_all).abs() < 1e-2, "all {all} vs brute {bf_all}");
        prop_assert!(all >= best - 1e-2);
    }

    /// `score_mod_sequence` with a single covered modification channel
    /// equals `score_sequence` plus that channel's weight, when `nblk` is
    /// exactly `nseq - 1` (a single alignment exists: one step per symbol,
    /// no stays at all, so the mod channel is added exactly once per step).
    #[test]
    fn mod_score_adds_channel_weight_along_only_alignment(
        nbase in 2usize..=4,
        seed in 0u64..10_000,
    ) {
        let ntrans = 2 * nbase * (nbase + 1);
        let seq = vec![0usize, 1 % nbase];
        let nblk = 1usize; // nseq - 1, the minimal non-empty window

        let plain = det_matrix(nblk, ntrans, seed);

        let can_nmods = vec![1usize; nbase];
        let mut can_mods_offsets = vec![0usize; nbase + 1];
        for b in 0..nbase {
            can_mods_offsets[b + 1] = can_mods_offsets[b] + can_nmods[b];
        }
        let m_total = can_mods_offsets[nbase];

        let weight = 0.37f32;
        let mut with_mods_data = plain.clone().into_vec();
        with_mods_data.resize(nblk * (ntrans + m_total), 0.0);
        let mut with_mods = Matrix::from_vec(nblk, ntrans + m_total, with_mods_data);
        for k in 0..nblk {
            for c in 0..ntrans {
                with_mods.set(k, c, plain.get(k, c));
            }
            // The step transition scores seq[1]'s mod channel, so the weight
            // must land at that base's slot, not base 0's.
            with_mods.set(k, ntrans + can_mods_offsets[seq[1]], weight);
        }

        let mod_cats = vec![0usize, 0usize];
        let plain_score = score_sequence(&plain, &seq, 0, nblk, false).unwrap();
        let mod_score = score_mod_sequence(
            &with_mods,
            &seq,
            &mod_cats,
            &can_mods_offsets,
            0,
            nblk,
            false,
        )
        .unwrap();

        prop_assert!((mod_score - plain_score - weight).abs() < 1e-4);
    }
}
