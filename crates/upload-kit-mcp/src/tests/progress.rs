// crates/upload-kit-mcp/src/tests/progress.rs
// ============================================================================
// Module: Progress Bar Property Tests
// Description: Property tests for progress bar rendering.
// Purpose: Keep frames within the bar width for arbitrary updates.
// Dependencies: proptest
// ============================================================================

//! ## Overview
//! Random updates must never overflow the bar or lose cells.

use proptest::prelude::*;

use crate::progress::EMPTY_CELL;
use crate::progress::FILLED_CELL;
use crate::progress::ProgressBar;
use crate::progress::ProgressFrame;
use crate::progress::ProgressUpdate;

proptest! {
    #[test]
    fn bounded_frames_fit_the_width(
        width in 1u16 .. 120,
        progress in -1.0e6f64 .. 1.0e6,
        total in 1.0e-3f64 .. 1.0e6,
    ) {
        let update = ProgressUpdate { progress, total: Some(total), message: None };
        let frame = ProgressBar::new(width).render(&update);
        let ProgressFrame::Bounded { filled, bar, .. } = frame else {
            return Err(TestCaseError::fail("positive total must render a bounded frame"));
        };
        prop_assert!(filled <= usize::from(width));
        prop_assert_eq!(bar.chars().count(), usize::from(width));
        prop_assert_eq!(bar.chars().filter(|cell| *cell == FILLED_CELL).count(), filled);
        prop_assert!(bar.chars().all(|cell| cell == FILLED_CELL || cell == EMPTY_CELL));
    }

    #[test]
    fn filled_cells_grow_with_progress(
        width in 1u16 .. 80,
        lower in 0.0f64 .. 100.0,
        step in 0.0f64 .. 100.0,
    ) {
        let bar = ProgressBar::new(width);
        let at = |progress: f64| match bar.render(&ProgressUpdate { progress, total: Some(100.0), message: None }) {
            ProgressFrame::Bounded { filled, .. } => filled,
            ProgressFrame::Unbounded { .. } => usize::MAX,
        };
        prop_assert!(at(lower) <= at(lower + step));
    }
}
