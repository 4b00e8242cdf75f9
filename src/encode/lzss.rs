use crate::format::{MIN_MATCH, WINDOW_SIZE};

/// Best match found for a position in the input
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(super) struct Found {
    /// number of bytes matched; `1` if there is nothing worth encoding
    pub length: usize,
    /// absolute position in the input where the match starts
    pub pos: usize,
}

/// Naive search for the longest run in the window behind `pos` that matches the input at `pos`.
///
/// Every start position in the window is checked, and runs may continue past `pos`
/// to find self-overlapping matches. Only a strictly longer run replaces the best
/// match, so ties keep the earliest (furthest) start. This matches the match
/// selection of Nintendo's encoder, so it should not be swapped for a "better" search.
///
/// A two byte run costs as much as two literals, so it is reported as length `1`.
pub(super) fn find_match(src: &[u8], pos: usize) -> Found {
    debug_assert!(pos <= src.len());

    let start = pos.saturating_sub(WINDOW_SIZE);
    let ahead = &src[pos..];

    let mut best = (start..pos)
        .map(|i| {
            let length = src[i..]
                .iter()
                .zip(ahead)
                .take_while(|(s, d)| s == d)
                .count();

            Found { length, pos: i }
        })
        .fold(Found { length: 1, pos: 0 }, |best, cur| {
            if cur.length > best.length {
                cur
            } else {
                best
            }
        });

    if best.length == 2 {
        best.length = 1;
    }

    best
}

/// Greedy match selection with one step of lookahead.
///
/// Before taking a match at `pos`, the selector checks `pos + 1`. If that match is
/// at least two bytes longer, `pos` becomes a literal and the longer match is held
/// for the next call. A selector lives for exactly one encode.
#[derive(Debug, Default)]
pub(super) struct MatchSelector {
    pending: Option<Found>,
}

impl MatchSelector {
    pub(super) fn select(&mut self, src: &[u8], pos: usize) -> Found {
        if let Some(next) = self.pending.take() {
            return next;
        }

        let current = find_match(src, pos);
        // the next position is only worth searching if there is a match to shadow
        if current.length >= MIN_MATCH {
            let next = find_match(src, pos + 1);

            if next.length >= current.length + 2 {
                self.pending = Some(next);
                return Found {
                    length: 1,
                    pos: current.pos,
                };
            }
        }

        current
    }

    /// Is there a deferred match waiting for the next position?
    pub(super) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_longest_run() {
        let src = b"ABCABCABCABC";
        assert_eq!(find_match(src, 3), Found { length: 9, pos: 0 });
    }

    #[test]
    fn nothing_behind_the_start() {
        assert_eq!(find_match(b"ABC", 0).length, 1);
        assert_eq!(find_match(b"ABC", 3).length, 1);
    }

    #[test]
    fn ties_keep_earliest_start() {
        let src = b"abcXabcYabc";
        assert_eq!(find_match(src, 8), Found { length: 3, pos: 0 });
    }

    #[test]
    fn two_byte_runs_are_literals() {
        let src = b"abXab";
        assert_eq!(find_match(src, 3).length, 1);
    }

    #[test]
    fn runs_overlap_into_lookahead() {
        let src = b"aaaa";
        assert_eq!(find_match(src, 1), Found { length: 3, pos: 0 });
    }

    #[test]
    fn window_is_4096_bytes() {
        let mut src = b"xyz".to_vec();
        src.extend(std::iter::repeat(0).take(WINDOW_SIZE - 3));
        src.extend_from_slice(b"xyz");
        assert_eq!(find_match(&src, WINDOW_SIZE), Found { length: 3, pos: 0 });

        let mut src = b"xyz".to_vec();
        src.extend(std::iter::repeat(0).take(WINDOW_SIZE - 2));
        src.extend_from_slice(b"xyz");
        assert_eq!(find_match(&src, WINDOW_SIZE + 1).length, 1);
    }

    #[test]
    fn defers_for_a_longer_match() {
        let src = b"abcXbcdefghYabcdefgh";
        let mut selector = MatchSelector::default();

        assert_eq!(find_match(src, 12), Found { length: 3, pos: 0 });

        let first = selector.select(src, 12);
        assert_eq!(first.length, 1);
        assert!(selector.is_pending());

        let second = selector.select(src, 13);
        assert_eq!(second, Found { length: 7, pos: 4 });
        assert!(!selector.is_pending());
    }

    #[test]
    fn keeps_match_without_enough_margin() {
        let src = b"abcXbcdeYabcde";
        let mut selector = MatchSelector::default();

        assert_eq!(selector.select(src, 9), Found { length: 3, pos: 0 });
        assert!(!selector.is_pending());
    }
}
