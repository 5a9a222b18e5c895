//! Single-race running style classification

use crate::models::RunningStyleFacts;

/// Worst rank that still counts as "prominent"
pub const PROMINENT_MAX_RANK: u32 = 4;

/// Classify one past race from its present corner ranks.
///
/// Returns `None` for an empty sequence; such records carry no data and are
/// skipped by the window selector.
///
/// A single-checkpoint race is judged on that one rank. With two or more
/// checkpoints the horse front-ran if it was first at the opening checkpoint,
/// or second there and first at the next one.
///
/// # Examples
/// ```
/// use pacebias::core::classifier::classify_run;
///
/// let facts = classify_run(&[2, 1, 1, 1]).unwrap();
/// assert!(facts.is_front_runner);
/// assert!(facts.stayed_prominent);
/// ```
pub fn classify_run(positions: &[u32]) -> Option<RunningStyleFacts> {
    let (&first, rest) = positions.split_first()?;

    let is_front_runner = match rest.first() {
        None => first == 1,
        Some(&second) => first == 1 || (first == 2 && second == 1),
    };
    let stayed_prominent = positions.iter().all(|&p| p <= PROMINENT_MAX_RANK);

    Some(RunningStyleFacts {
        is_front_runner,
        stayed_prominent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(positions: &[u32]) -> RunningStyleFacts {
        classify_run(positions).unwrap()
    }

    #[test]
    fn test_empty_sequence() {
        assert!(classify_run(&[]).is_none());
    }

    #[test]
    fn test_single_checkpoint_front_runner() {
        for v in 1..=18 {
            assert_eq!(facts(&[v]).is_front_runner, v == 1, "rank {}", v);
        }
    }

    #[test]
    fn test_single_checkpoint_second_is_not_front_runner() {
        // Second place alone has no following checkpoint to lead at
        assert!(!facts(&[2]).is_front_runner);
    }

    #[test]
    fn test_multi_checkpoint_front_runner_rule() {
        for p0 in 1..=6 {
            for p1 in 1..=6 {
                let expected = p0 == 1 || (p0 == 2 && p1 == 1);
                assert_eq!(
                    facts(&[p0, p1, 9]).is_front_runner,
                    expected,
                    "sequence {}-{}",
                    p0,
                    p1
                );
            }
        }
    }

    #[test]
    fn test_front_runner_ignores_later_checkpoints() {
        assert!(facts(&[1, 8, 10, 12]).is_front_runner);
        assert!(!facts(&[3, 1, 1, 1]).is_front_runner);
        assert!(!facts(&[2, 2, 1, 1]).is_front_runner);
    }

    #[test]
    fn test_stayed_prominent() {
        assert!(facts(&[4, 4, 4, 4]).stayed_prominent);
        assert!(facts(&[1]).stayed_prominent);
        assert!(!facts(&[1, 2, 3, 5]).stayed_prominent);
        assert!(!facts(&[5]).stayed_prominent);
    }

    #[test]
    fn test_front_runner_that_faded() {
        let f = facts(&[1, 1, 3, 7]);
        assert!(f.is_front_runner);
        assert!(!f.stayed_prominent);
    }
}
