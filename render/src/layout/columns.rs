//! Column allocation per layout mode. Panels are separated by ` │ `
//! (3 columns); when the image column is disabled its budget folds into
//! the main panel so no width is wasted.

use crate::layout::mode::LayoutMode;

pub const SEPARATOR: &str = " │ ";
const SEPARATOR_WIDTH: usize = 3;

const ULTRA_IMAGE: usize = 24;
const ULTRA_MAIN: usize = 50;
const ULTRA_INFO: usize = 50;
const ULTRA_SPARK_MIN: usize = 20;

const WIDE_IMAGE: usize = 24;
const WIDE_MAIN: usize = 60;
const WIDE_INFO_MIN: usize = 40;

const STANDARD_IMAGE: usize = 22;
const STANDARD_MAIN_MIN: usize = 40;

/// Margin around the single compact column (room for an optional box).
const COMPACT_MARGIN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPlan {
    pub image: Option<usize>,
    pub main: usize,
    pub info: Option<usize>,
    pub sparkline: Option<usize>,
}

impl ColumnPlan {
    /// Number of panels in left-to-right order.
    pub fn panel_count(&self) -> usize {
        1 + usize::from(self.image.is_some())
            + usize::from(self.info.is_some())
            + usize::from(self.sparkline.is_some())
    }

    /// Total width consumed including separators; never exceeds the width
    /// the plan was built for.
    pub fn total_width(&self) -> usize {
        let widths = self.image.unwrap_or(0)
            + self.main
            + self.info.unwrap_or(0)
            + self.sparkline.unwrap_or(0);
        widths + (self.panel_count() - 1) * SEPARATOR_WIDTH
    }
}

pub fn plan_columns(mode: LayoutMode, width: usize, with_image: bool) -> ColumnPlan {
    match mode {
        LayoutMode::UltraWide => {
            let separators = 3 * SEPARATOR_WIDTH;
            let sparkline = (width.saturating_sub(ULTRA_IMAGE + ULTRA_MAIN + ULTRA_INFO + separators))
                .max(ULTRA_SPARK_MIN);
            let mut plan = ColumnPlan {
                image: Some(ULTRA_IMAGE),
                main: ULTRA_MAIN,
                info: Some(ULTRA_INFO),
                sparkline: Some(sparkline),
            };
            if !with_image {
                plan.image = None;
                plan.main += ULTRA_IMAGE + SEPARATOR_WIDTH;
            }
            plan
        }
        LayoutMode::Wide => {
            let separators = 2 * SEPARATOR_WIDTH;
            let info = (width.saturating_sub(WIDE_IMAGE + WIDE_MAIN + separators)).max(WIDE_INFO_MIN);
            let mut plan = ColumnPlan {
                image: Some(WIDE_IMAGE),
                main: WIDE_MAIN,
                info: Some(info),
                sparkline: None,
            };
            if !with_image {
                plan.image = None;
                plan.main += WIDE_IMAGE + SEPARATOR_WIDTH;
            }
            plan
        }
        LayoutMode::Standard => {
            let main = (width.saturating_sub(STANDARD_IMAGE + SEPARATOR_WIDTH)).max(STANDARD_MAIN_MIN);
            if with_image {
                ColumnPlan {
                    image: Some(STANDARD_IMAGE),
                    main,
                    info: None,
                    sparkline: None,
                }
            } else {
                ColumnPlan {
                    image: None,
                    main: width.saturating_sub(COMPACT_MARGIN).max(STANDARD_MAIN_MIN),
                    info: None,
                    sparkline: None,
                }
            }
        }
        LayoutMode::Compact => ColumnPlan {
            image: None,
            main: width.saturating_sub(COMPACT_MARGIN).max(1),
            info: None,
            sparkline: None,
        },
    }
}
