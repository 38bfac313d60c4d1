/// A candidate backreference found in the already-seen input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Distance back from the current position, always >= 1
    pub distance: usize,
    /// Number of bytes covered
    pub length: usize,
}

/// Find the longest prior occurrence of the bytes at `pos`
///
/// Candidates start in `[floor, pos)` and must agree with the input for at
/// least `min_len` bytes. The match is extended as far as the input allows,
/// up to `max_len` (it may run into the bytes it is copying, as usual for LZ77).
/// Among equally long matches, the most recent one (smallest distance) wins.
///
/// Returns `None` if no candidate reaches `min_len`.
pub fn find_best_match(
    inp: &[u8],
    pos: usize,
    min_len: usize,
    floor: usize,
    max_len: usize,
) -> Option<Match> {
    if min_len == 0 || min_len > max_len || pos + min_len > inp.len() {
        return None;
    }

    let needle = &inp[pos..pos + min_len];
    let longest_possible = usize::min(max_len, inp.len() - pos);
    let mut best: Option<Match> = None;

    // walk backwards, so that the first candidate of any given length is the most recent
    for cand in (floor..pos).rev() {
        if inp[cand..cand + min_len] != *needle {
            continue;
        }

        let len = min_len
            + inp[cand + min_len..]
                .iter()
                .zip(inp[pos + min_len..pos + longest_possible].iter())
                .map_while(|(a, b)| if a == b { Some(1) } else { None })
                .fold(0, |a, x| a + x);

        if best.map_or(true, |b| len > b.length) {
            best = Some(Match {
                distance: pos - cand,
                length: len,
            });
            if len == longest_possible {
                break;
            }
        }
    }

    best
}

/// Find the longest run of `symbol` starting in `[floor, pos)`
///
/// Runs are only counted inside the window. Ties go to the most recent run, and
/// the search stops as soon as a run of `wanted` bytes is seen.
pub fn find_longest_marker_run(
    inp: &[u8],
    pos: usize,
    symbol: u8,
    floor: usize,
    wanted: usize,
) -> Option<Match> {
    let mut best: Option<Match> = None;
    let mut cur_len = 0;

    for k in (floor..pos).rev() {
        if inp[k] != symbol {
            cur_len = 0;
            continue;
        }

        cur_len += 1;
        if best.map_or(true, |b| cur_len > b.length) {
            best = Some(Match {
                distance: pos - k,
                length: cur_len,
            });
            if cur_len == wanted {
                break;
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_window() {
        assert_eq!(find_best_match(b"abab", 0, 2, 0, 256), None);
        // min_len runs past the end
        assert_eq!(find_best_match(b"abab", 3, 2, 0, 256), None);
        // min_len not encodable
        assert_eq!(find_best_match(b"abab", 2, 2, 0, 1), None);
    }

    #[test]
    fn test_simple_match() {
        assert_eq!(
            find_best_match(b"abcabcabc", 3, 2, 0, 256),
            Some(Match {
                distance: 3,
                length: 6
            })
        );
    }

    #[test]
    fn test_prefers_longer_over_recent() {
        // "abcd" at 0, "abx" at 5, then "abcd" at 9
        let inp = b"abcd_abx_abcd";
        assert_eq!(
            find_best_match(inp, 9, 2, 0, 256),
            Some(Match {
                distance: 9,
                length: 4
            })
        );
    }

    #[test]
    fn test_ties_go_to_most_recent() {
        let inp = b"ab_ab_ab";
        assert_eq!(
            find_best_match(inp, 6, 2, 0, 256),
            Some(Match {
                distance: 3,
                length: 2
            })
        );
    }

    #[test]
    fn test_floor_limits_window() {
        let inp = b"abcd____abcd";
        assert_eq!(find_best_match(inp, 8, 2, 1, 256), None);
        assert_eq!(
            find_best_match(inp, 8, 2, 0, 256),
            Some(Match {
                distance: 8,
                length: 4
            })
        );
    }

    #[test]
    fn test_overlapping_and_capped() {
        let inp = [7u8; 10];
        assert_eq!(
            find_best_match(&inp, 1, 2, 0, 256),
            Some(Match {
                distance: 1,
                length: 9
            })
        );
        assert_eq!(
            find_best_match(&inp, 1, 2, 0, 4),
            Some(Match {
                distance: 1,
                length: 4
            })
        );
    }

    #[test]
    fn test_marker_run_search() {
        let inp = b"\0\0\0x\0\0x\0yz";
        // longest is the leading run of three
        assert_eq!(
            find_longest_marker_run(inp, 9, 0, 0, 3),
            Some(Match {
                distance: 9,
                length: 3
            })
        );
        // a run of two is found before the far one
        assert_eq!(
            find_longest_marker_run(inp, 9, 0, 0, 2),
            Some(Match {
                distance: 5,
                length: 2
            })
        );
        // window cuts the leading run down to a single byte
        assert_eq!(
            find_longest_marker_run(inp, 9, 0, 2, 3),
            Some(Match {
                distance: 5,
                length: 2
            })
        );
        assert_eq!(find_longest_marker_run(b"xyz", 3, 0, 0, 1), None);
    }
}
