//! Display-mode correction rule.
//!
//! Line charts of growth rate and top customers only make sense at monthly
//! granularity. On every date change a non-month interval forces both panels
//! to table. A month interval leaves each panel's stored mode as it was; it
//! never switches a panel back to line.

use crate::model::date_filter::Interval;
use crate::model::display::DisplayMode;

/// Returns the display mode a panel holds after a date change.
pub fn corrected_display_mode(current: DisplayMode, interval: Interval) -> DisplayMode {
    if interval == Interval::Month {
        current
    } else {
        DisplayMode::Table
    }
}

/// Whether the line/table toggle is locked for this interval.
pub fn mode_selection_disabled(interval: Interval) -> bool {
    interval != Interval::Month
}

#[cfg(test)]
mod tests {
    use super::{corrected_display_mode, mode_selection_disabled};
    use crate::model::date_filter::Interval;
    use crate::model::display::DisplayMode;

    #[test]
    fn non_month_intervals_force_table() {
        for interval in [Interval::Day, Interval::Week] {
            assert_eq!(
                corrected_display_mode(DisplayMode::Line, interval),
                DisplayMode::Table
            );
            assert_eq!(
                corrected_display_mode(DisplayMode::Table, interval),
                DisplayMode::Table
            );
            assert!(mode_selection_disabled(interval));
        }
    }

    #[test]
    fn month_interval_keeps_stored_mode() {
        assert_eq!(
            corrected_display_mode(DisplayMode::Line, Interval::Month),
            DisplayMode::Line
        );
        // Table stays table: month never forces back to line.
        assert_eq!(
            corrected_display_mode(DisplayMode::Table, Interval::Month),
            DisplayMode::Table
        );
        assert!(!mode_selection_disabled(Interval::Month));
    }
}
