use crate::content::ContentBlock;
use crate::font::{FontLibrary, FontRole};
use crate::measure::wrapped_line_count;
use crate::style::{CanvasSpec, Theme};
use crate::types::Px;

pub const SOLVER_ATTEMPTS: usize = 5;
pub const SHRINK_FACTOR: f32 = 0.88;

/// A block that survived layout, with its computed height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedBlock {
    pub index: usize,
    pub height: Px,
}

/// The solver's output: a uniform font scale, the inter-block gap, and the
/// ordered subset of blocks that fit above the footer boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub font_scale: f32,
    pub gap: Px,
    pub blocks: Vec<PlannedBlock>,
    /// Trailing blocks excluded by the overflow guard. Exposed so callers
    /// can observe truncation instead of only finding it in logs.
    pub dropped: usize,
}

impl LayoutPlan {
    pub fn used_height(&self) -> Px {
        let heights: Px = self.blocks.iter().map(|b| b.height).sum();
        let gaps = self.blocks.len().saturating_sub(1) as i32;
        heights + self.gap * gaps
    }
}

/// Wrap widths are fixed per role; only font sizes and line heights scale.
fn header_wrap_width(canvas: &CanvasSpec) -> Px {
    canvas.content_width() - Px::from_i32(40)
}

fn bullet_wrap_width(canvas: &CanvasSpec) -> Px {
    canvas.content_width() - Px::from_i32(80)
}

fn takeaway_wrap_width(canvas: &CanvasSpec) -> Px {
    canvas.content_width() - Px::from_i32(60)
}

/// Vertical pixel height a block will occupy once wrapped at `font_scale`.
/// Never draws; exists so the solver can evaluate candidate scales cheaply.
pub fn estimate_block_height(
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    block: &ContentBlock,
    font_scale: f32,
) -> Px {
    match block {
        ContentBlock::Header { title, subtitle } => {
            let title_lines = wrapped_line_count(
                fonts,
                FontRole::Title,
                theme.title_size.scaled(font_scale),
                title,
                header_wrap_width(canvas),
            );
            let subtitle_lines = subtitle.as_deref().map_or(0, |subtitle| {
                wrapped_line_count(
                    fonts,
                    FontRole::Subtitle,
                    theme.subtitle_size.scaled(font_scale),
                    subtitle,
                    header_wrap_width(canvas),
                )
            });
            theme.title_line_height.scaled(font_scale) * title_lines as i32
                + theme.subtitle_line_height.scaled(font_scale) * subtitle_lines as i32
                + Px::from_i32(40).scaled(font_scale)
        }
        ContentBlock::Section(section) => {
            let mut height = if section.heading.is_some() {
                theme.heading_line_height.scaled(font_scale)
            } else {
                Px::from_i32(10).scaled(font_scale)
            };
            let body_size = theme.body_size.scaled(font_scale);
            for bullet in &section.bullets {
                let lines = wrapped_line_count(
                    fonts,
                    FontRole::Body,
                    body_size,
                    bullet,
                    bullet_wrap_width(canvas),
                );
                height += theme.bullet_line_height.scaled(font_scale) * lines as i32
                    + theme.bullet_spacing.scaled(font_scale);
            }
            height + Px::from_i32(20).scaled(font_scale)
        }
        ContentBlock::Takeaway { text } => {
            let lines = wrapped_line_count(
                fonts,
                FontRole::Heading,
                theme.heading_size.scaled(font_scale),
                text,
                takeaway_wrap_width(canvas),
            );
            theme.takeaway_line_height.scaled(font_scale) * lines as i32
                + Px::from_i32(40).scaled(font_scale)
        }
    }
}

/// Searches for the largest uniform font scale whose total height (plus
/// minimum gaps) fits the vertical budget. Bounded geometric search: up to
/// [`SOLVER_ATTEMPTS`] steps of x[`SHRINK_FACTOR`]. On exhaustion the
/// smallest scale is kept and the overflow guard handles the rest.
pub fn solve_scale(
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    blocks: &[ContentBlock],
) -> (f32, Vec<Px>) {
    let budget = canvas.budget();
    let mut font_scale = 1.0f32;

    for attempt in 0..SOLVER_ATTEMPTS {
        let heights: Vec<Px> = blocks
            .iter()
            .map(|block| estimate_block_height(fonts, theme, canvas, block, font_scale))
            .collect();
        let gaps = blocks.len().saturating_sub(1) as i32;
        let total: Px = heights.iter().sum::<Px>() + theme.min_gap(font_scale) * gaps;
        if total <= budget {
            log::debug!(
                "content fits with font_scale={font_scale:.2}, total={}px",
                total.round_i32()
            );
            return (font_scale, heights);
        }
        log::debug!(
            "attempt {}: content does not fit ({}px > {}px), shrinking to {:.2}",
            attempt + 1,
            total.round_i32(),
            budget.round_i32(),
            font_scale * SHRINK_FACTOR
        );
        font_scale *= SHRINK_FACTOR;
    }

    let heights = blocks
        .iter()
        .map(|block| estimate_block_height(fonts, theme, canvas, block, font_scale))
        .collect();
    (font_scale, heights)
}

/// Distributes leftover vertical space evenly across inter-block gaps,
/// clamped to [min_gap, max_gap]. Negative leftover falls back to the
/// minimum gap (possible after the guard changes the block count).
pub fn allocate_gap(
    theme: &Theme,
    font_scale: f32,
    num_blocks: usize,
    used_height: Px,
    budget: Px,
) -> Px {
    let min_gap = theme.min_gap(font_scale);
    if num_blocks <= 1 {
        return min_gap;
    }
    let gaps = (num_blocks - 1) as i32;
    let leftover = budget - used_height;
    if leftover <= Px::ZERO {
        return min_gap;
    }
    let gap = leftover / gaps;
    gap.max(min_gap).min(theme.max_gap())
}

/// Walks the block list with a running cursor and excludes any block (and
/// everything after it) that would cross the footer boundary. The header is
/// never excluded.
fn apply_overflow_guard(
    canvas: &CanvasSpec,
    gap: Px,
    heights: &[Px],
) -> (Vec<PlannedBlock>, usize) {
    let boundary = canvas.max_content_y();
    let mut cursor = canvas.margin_y;
    let mut kept = Vec::with_capacity(heights.len());

    for (index, &height) in heights.iter().enumerate() {
        let is_last = index == heights.len() - 1;
        let trailing = if is_last { Px::ZERO } else { gap };
        if index > 0 && cursor + height + trailing > boundary {
            log::debug!(
                "dropping block {index} and {} following: cursor {} + height {} crosses {}",
                heights.len() - index - 1,
                cursor.round_i32(),
                height.round_i32(),
                boundary.round_i32()
            );
            break;
        }
        kept.push(PlannedBlock { index, height });
        cursor += height + gap;
    }

    let dropped = heights.len() - kept.len();
    (kept, dropped)
}

/// Full pipeline: solve a scale, spread the leftover across gaps, then prune
/// anything that still overflows.
pub fn plan(
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    blocks: &[ContentBlock],
) -> LayoutPlan {
    let (font_scale, heights) = solve_scale(fonts, theme, canvas, blocks);
    let used: Px = heights.iter().sum();
    let gap = allocate_gap(theme, font_scale, heights.len(), used, canvas.budget());
    let (kept, dropped) = apply_overflow_guard(canvas, gap, &heights);

    LayoutPlan {
        font_scale,
        gap,
        blocks: kept,
        dropped,
    }
}
