/// One click of the quantity stepper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Decrement,
    Increment,
}

/// Apply `step` to `current` and keep the result inside `[1, max]`.
///
/// The lower bound wins when `max < 1`: a sold-out drop still displays a
/// quantity of 1, and the action button is disabled by eligibility instead.
pub fn clamp(current: u32, step: Step, max: u32) -> u32 {
    let candidate = match step {
        Step::Decrement => current.saturating_sub(1),
        Step::Increment => current.saturating_add(1),
    };
    if candidate < 1 {
        1
    } else if candidate > max {
        max.max(1)
    } else {
        candidate
    }
}

pub fn can_decrement(current: u32, sold_out: bool) -> bool {
    !sold_out && current > 1
}

pub fn can_increment(current: u32, max: u32, sold_out: bool) -> bool {
    !sold_out && current.saturating_add(1) <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_stays_in_bounds() {
        for max in [1u32, 2, 5, 50, 1_000_000] {
            for q in (1..=max).take(60) {
                for step in [Step::Decrement, Step::Increment] {
                    let next = clamp(q, step, max);
                    assert!((1..=max).contains(&next), "clamp({q}, {step:?}, {max}) = {next}");
                }
            }
        }
    }

    #[test]
    fn test_clamp_edges() {
        assert_eq!(clamp(1, Step::Decrement, 10), 1);
        assert_eq!(clamp(10, Step::Increment, 10), 10);
        assert_eq!(clamp(4, Step::Increment, 10), 5);
        assert_eq!(clamp(4, Step::Decrement, 10), 3);
    }

    #[test]
    fn test_clamp_pulls_stale_quantity_down() {
        // The bound shrank after the quantity was chosen.
        assert_eq!(clamp(20, Step::Decrement, 5), 5);
        assert_eq!(clamp(20, Step::Increment, 5), 5);
    }

    #[test]
    fn test_clamp_zero_max_still_one() {
        assert_eq!(clamp(1, Step::Increment, 0), 1);
        assert_eq!(clamp(1, Step::Decrement, 0), 1);
    }

    #[test]
    fn test_stepper_enablement() {
        assert!(!can_decrement(1, false));
        assert!(can_decrement(2, false));
        assert!(!can_decrement(2, true));
        assert!(can_increment(4, 5, false));
        assert!(!can_increment(5, 5, false));
        assert!(!can_increment(1, 5, true));
    }
}
