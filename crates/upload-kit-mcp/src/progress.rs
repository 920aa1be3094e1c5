// crates/upload-kit-mcp/src/progress.rs
// ============================================================================
// Module: Progress Rendering
// Description: Progress notification payloads and text progress bars.
// Purpose: Turn `notifications/progress` updates into terminal frames.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Servers report `progress` and, when known, `total`. With a usable total the
//! update renders as a fixed-width bar plus a percentage; otherwise only the
//! raw progress value is shown. Rendering is pure so the CLI decides where
//! frames go.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bar width in cells.
pub const DEFAULT_BAR_WIDTH: u16 = 40;
/// Filled cell.
pub const FILLED_CELL: char = '█';
/// Empty cell.
pub const EMPTY_CELL: char = '░';

// ============================================================================
// SECTION: Types
// ============================================================================

/// Progress notification payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProgressUpdate {
    /// Progress so far.
    pub progress: f64,
    /// Total, when the server knows it.
    #[serde(default)]
    pub total: Option<f64>,
    /// Optional human-readable status.
    #[serde(default)]
    pub message: Option<String>,
}

/// One rendered progress frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressFrame {
    /// Progress against a known total.
    Bounded {
        /// Percentage complete (not clamped).
        percentage: f64,
        /// Filled cells, clamped to the bar width.
        filled: usize,
        /// Rendered bar.
        bar: String,
    },
    /// Progress without a usable total.
    Unbounded {
        /// Raw progress value.
        progress: f64,
    },
}

impl ProgressFrame {
    /// Renders `[bar] 12.3%` or the raw progress value.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Bounded {
                percentage,
                bar,
                ..
            } => format!("[{bar}] {percentage:.1}%"),
            Self::Unbounded {
                progress,
            } => raw_progress(*progress),
        }
    }
}

/// Formats a raw progress value, keeping one decimal on whole numbers.
fn raw_progress(progress: f64) -> String {
    let mut text = format!("{progress}");
    if progress.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Fixed-width text progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBar {
    /// Width in cells.
    width: u16,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new(DEFAULT_BAR_WIDTH)
    }
}

impl ProgressBar {
    /// Creates a bar of `width` cells.
    #[must_use]
    pub const fn new(width: u16) -> Self {
        Self {
            width,
        }
    }

    /// Renders an update.
    #[must_use]
    pub fn render(self, update: &ProgressUpdate) -> ProgressFrame {
        let Some(total) = update.total.filter(|total| total.is_finite() && *total > 0.0) else {
            return ProgressFrame::Unbounded {
                progress: update.progress,
            };
        };
        let scaled = f64::from(self.width) * update.progress / total;
        let filled = (1 ..= self.width).filter(|cell| f64::from(*cell) <= scaled).count();
        let empty = usize::from(self.width).saturating_sub(filled);
        let mut bar = String::with_capacity(usize::from(self.width) * FILLED_CELL.len_utf8());
        bar.extend(std::iter::repeat_n(FILLED_CELL, filled));
        bar.extend(std::iter::repeat_n(EMPTY_CELL, empty));
        ProgressFrame::Bounded {
            percentage: update.progress / total * 100.0,
            filled,
            bar,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn update(progress: f64, total: Option<f64>) -> ProgressUpdate {
        ProgressUpdate {
            progress,
            total,
            message: None,
        }
    }

    #[test]
    fn half_way_fills_half_the_bar() {
        let frame = ProgressBar::default().render(&update(50.0, Some(100.0)));
        assert_eq!(frame.label(), format!("[{}{}] 50.0%", "█".repeat(20), "░".repeat(20)));
    }

    #[test]
    fn missing_or_zero_total_renders_raw_progress() {
        let bar = ProgressBar::default();
        assert_eq!(bar.render(&update(1024.0, None)), ProgressFrame::Unbounded { progress: 1024.0 });
        assert_eq!(
            bar.render(&update(3.0, Some(0.0))),
            ProgressFrame::Unbounded { progress: 3.0 }
        );
    }

    #[test]
    fn raw_progress_label_keeps_decimal_point() {
        let bar = ProgressBar::default();
        assert_eq!(bar.render(&update(1024.0, None)).label(), "1024.0");
        assert_eq!(bar.render(&update(0.0, None)).label(), "0.0");
        assert_eq!(bar.render(&update(12.25, None)).label(), "12.25");
        assert_eq!(bar.render(&update(f64::NAN, None)).label(), "NaN");
    }

    #[test]
    fn overshoot_is_clamped_to_width() {
        let frame = ProgressBar::new(10).render(&update(150.0, Some(100.0)));
        match frame {
            ProgressFrame::Bounded {
                filled,
                bar,
                percentage,
            } => {
                assert_eq!(filled, 10);
                assert_eq!(bar.chars().count(), 10);
                assert!((percentage - 150.0).abs() < f64::EPSILON);
            }
            ProgressFrame::Unbounded {
                ..
            } => unreachable!("total is positive"),
        }
    }
}
