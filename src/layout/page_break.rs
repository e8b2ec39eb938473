//! # Page Break Decisions
//!
//! The layout has exactly two transitions per image. This module holds the
//! fit test that chooses between them; the cursor bookkeeping lives in the
//! parent module.

/// What to do with the next image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Stack the image directly below the previous one.
    SamePage,
    /// Start a fresh page and place the image at the top.
    NewPage,
}

/// Decide whether an image of `rendered_height` fits below `vertical_position`.
///
/// Position 0 is the bottom margin. The very first image of a run always
/// opens a page.
pub fn decide_break(is_first_image: bool, vertical_position: i64, rendered_height: i64) -> BreakDecision {
    if is_first_image || vertical_position.checked_sub(rendered_height).map_or(true, |rest| rest < 0) {
        BreakDecision::NewPage
    } else {
        BreakDecision::SamePage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_image_always_breaks() {
        assert_eq!(decide_break(true, 10_000, 1), BreakDecision::NewPage);
    }

    #[test]
    fn exact_fit_stays() {
        assert_eq!(decide_break(false, 281, 281), BreakDecision::SamePage);
    }

    #[test]
    fn one_point_short_breaks() {
        assert_eq!(decide_break(false, 280, 281), BreakDecision::NewPage);
    }

    #[test]
    fn negative_position_breaks() {
        assert_eq!(decide_break(false, -5, 0), BreakDecision::NewPage);
    }

    #[test]
    fn extreme_values_break_without_overflow() {
        assert_eq!(decide_break(false, i64::MIN, 1), BreakDecision::NewPage);
        assert_eq!(decide_break(false, i64::MIN, i64::MAX), BreakDecision::NewPage);
    }
}
