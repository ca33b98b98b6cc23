//! Candidate-plane split heuristic.
//!
//! A node's members are tested against evenly spaced planes along the chosen axis. Each
//! plane is scored as `0.5 + f * left + (1 - f) * right`, where `f` is the plane's
//! position as a fraction of the node extent and `left`/`right` count the member
//! midpoints on either side. When the cheapest plane leaves one side empty the members
//! are split at their median instead, so both children always shrink.

use log::trace;

/// Number of planes tested, at fractions `1/12 ..= 11/12` of the extent.
pub const SPLIT_CANDIDATES: usize = 11;

const TRAVERSAL_COST: f32 = 0.5;

/// Where to cut a member list sorted by midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    /// Members `[..at]` go left, `[at..]` go right.
    pub at: usize,
    /// Winning candidate plane, even when the median fallback overrode it.
    pub candidate: usize,
    pub median_fallback: bool,
}

pub fn candidate_fraction(candidate: usize) -> f32 {
    (candidate + 1) as f32 / (SPLIT_CANDIDATES + 1) as f32
}

/// Chooses a split for `midpoints`, which must be sorted ascending and hold at least two
/// entries. `start` and `length` describe the node's extent along the same axis.
pub fn choose_split(midpoints: &[f32], start: f32, length: f32) -> Split {
    let count = midpoints.len();

    let mut best_cost = f32::INFINITY;
    let mut best_candidate = 0;
    let mut best_at = 0;

    for candidate in 0..SPLIT_CANDIDATES {
        let fraction = candidate_fraction(candidate);
        let plane = start + fraction * length;

        // Sorted input: everything strictly below the plane is a prefix.
        let left_count = midpoints.partition_point(|&midpoint| midpoint < plane);
        let right_count = count - left_count;

        let cost = TRAVERSAL_COST
            + fraction * left_count as f32
            + (1.0 - fraction) * right_count as f32;

        if cost < best_cost {
            best_cost = cost;
            best_candidate = candidate;
            best_at = left_count;
        }
    }

    if best_at == 0 || best_at == count {
        let at = count.div_ceil(2);
        trace!("Degenerate split over {count} members, falling back to median at {at}");
        return Split {
            at,
            candidate: best_candidate,
            median_fallback: true,
        };
    }

    Split {
        at: best_at,
        candidate: best_candidate,
        median_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_lie_strictly_inside_extent() {
        assert_eq!(candidate_fraction(0), 1.0 / 12.0);
        assert_eq!(candidate_fraction(SPLIT_CANDIDATES - 1), 11.0 / 12.0);
    }

    #[test]
    fn separates_two_clusters() {
        let split = choose_split(&[1.0, 1.0, 1.0, 9.0, 9.0, 9.0], 0.0, 10.0);

        assert_eq!(split.at, 3);
        assert!(!split.median_fallback);
        assert!((1..=9).contains(&split.candidate));
    }

    #[test]
    fn cost_prefers_planes_that_isolate_the_sparse_side() {
        let split = choose_split(&[0.5, 9.0, 9.2, 9.4, 9.6], 0.0, 10.0);

        assert_eq!(split.at, 1);
        assert_eq!(split.candidate, 9);
        assert!(!split.median_fallback);
    }

    #[test]
    fn coincident_midpoints_fall_back_to_median() {
        let split = choose_split(&[5.0, 5.0, 5.0], 4.999, 0.002);

        assert!(split.median_fallback);
        assert_eq!(split.at, 2);
    }

    #[test]
    fn median_fallback_rounds_up() {
        assert_eq!(choose_split(&[1.0; 4], 0.0, 2.0).at, 2);
        assert_eq!(choose_split(&[1.0; 7], 0.0, 2.0).at, 4);
    }
}
