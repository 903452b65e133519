use crate::error::PlacardError;
use crate::types::{Color, Px};

/// Fixed canvas geometry for one render call. The footer strip at the bottom
/// is reserved for branding; content must never cross into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    pub width: Px,
    pub height: Px,
    pub margin_x: Px,
    pub margin_y: Px,
    pub footer_height: Px,
}

impl CanvasSpec {
    /// LinkedIn-friendly vertical infographic format.
    pub fn portrait_768x1344() -> Self {
        Self {
            width: Px::from_i32(768),
            height: Px::from_i32(1344),
            margin_x: Px::from_i32(64),
            margin_y: Px::from_i32(64),
            footer_height: Px::from_i32(100),
        }
    }

    pub fn content_width(&self) -> Px {
        self.width - self.margin_x * 2
    }

    /// Lowest y content may reach. A 20px guard band keeps text clear of the
    /// footer strip.
    pub fn max_content_y(&self) -> Px {
        self.height - self.footer_height - Px::from_i32(20)
    }

    /// Vertical pixel budget between the top margin and the footer boundary.
    pub fn budget(&self) -> Px {
        self.max_content_y() - self.margin_y - Px::from_i32(20)
    }

    pub fn validate(&self) -> Result<(), PlacardError> {
        if self.width <= Px::ZERO || self.height <= Px::ZERO {
            return Err(PlacardError::DegenerateCanvas(format!(
                "canvas {}x{} has a non-positive dimension",
                self.width.round_i32(),
                self.height.round_i32()
            )));
        }
        if self.budget() <= Px::ZERO {
            return Err(PlacardError::DegenerateCanvas(format!(
                "margin {} + footer {} leave no vertical budget in height {}",
                self.margin_y.round_i32(),
                self.footer_height.round_i32(),
                self.height.round_i32()
            )));
        }
        if self.content_width() <= Px::ZERO {
            return Err(PlacardError::DegenerateCanvas(format!(
                "margin {} leaves no content width in width {}",
                self.margin_x.round_i32(),
                self.width.round_i32()
            )));
        }
        Ok(())
    }
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self::portrait_768x1344()
    }
}

/// Immutable style table, constructed once and passed explicitly into the
/// layout and raster stages. Theme variants are plain per-call overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub title_color: Color,
    pub subtitle_color: Color,
    pub body_color: Color,
    pub bullet_color: Color,
    pub accent_color: Color,
    pub footer_color: Color,
    pub footer_shadow: Color,
    pub header_card_fill: Color,
    pub section_card_fill: Color,

    pub title_size: Px,
    pub subtitle_size: Px,
    pub heading_size: Px,
    pub body_size: Px,
    pub footer_size: Px,

    pub title_line_height: Px,
    pub subtitle_line_height: Px,
    pub heading_line_height: Px,
    pub bullet_line_height: Px,
    pub bullet_spacing: Px,
    pub takeaway_line_height: Px,

    pub section_gap: Px,
    pub card_radius: Px,
    pub header_card_padding: Px,
    pub section_card_padding: Px,
}

impl Theme {
    /// Minimum inter-block gap at a given font scale. Floored at 12px so
    /// cards never visually touch.
    pub fn min_gap(&self, font_scale: f32) -> Px {
        self.section_gap
            .scaled(font_scale)
            .mul_ratio(2, 5)
            .max(Px::from_i32(12))
    }

    /// Largest allowed inter-block gap: 2.5x the base section gap.
    pub fn max_gap(&self) -> Px {
        self.section_gap.mul_ratio(5, 2)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title_color: Color::BLACK,
            subtitle_color: Color::rgb8(20, 15, 10),
            body_color: Color::BLACK,
            bullet_color: Color::BLACK,
            accent_color: Color::rgb8(0, 123, 255),
            footer_color: Color::WHITE,
            footer_shadow: Color::rgba8(0, 0, 0, 120),
            header_card_fill: Color::rgba8(255, 255, 255, 200),
            section_card_fill: Color::rgba8(255, 255, 255, 185),

            title_size: Px::from_i32(52),
            subtitle_size: Px::from_i32(32),
            heading_size: Px::from_i32(36),
            body_size: Px::from_i32(28),
            footer_size: Px::from_i32(24),

            title_line_height: Px::from_i32(60),
            subtitle_line_height: Px::from_i32(40),
            heading_line_height: Px::from_i32(50),
            bullet_line_height: Px::from_i32(34),
            bullet_spacing: Px::from_i32(8),
            takeaway_line_height: Px::from_i32(44),

            section_gap: Px::from_i32(32),
            card_radius: Px::from_i32(24),
            header_card_padding: Px::from_i32(24),
            section_card_padding: Px::from_i32(16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_is_valid() {
        let canvas = CanvasSpec::default();
        assert!(canvas.validate().is_ok());
        assert_eq!(canvas.content_width().round_i32(), 640);
        assert_eq!(canvas.max_content_y().round_i32(), 1224);
        assert_eq!(canvas.budget().round_i32(), 1140);
    }

    #[test]
    fn footer_swallowing_canvas_is_rejected() {
        let canvas = CanvasSpec {
            footer_height: Px::from_i32(1300),
            ..CanvasSpec::default()
        };
        assert!(matches!(
            canvas.validate(),
            Err(PlacardError::DegenerateCanvas(_))
        ));
    }

    #[test]
    fn min_gap_floors_at_twelve_pixels() {
        let theme = Theme::default();
        assert_eq!(theme.min_gap(1.0).round_i32(), 13);
        assert_eq!(theme.min_gap(0.5).round_i32(), 12);
        assert_eq!(theme.min_gap(0.1).round_i32(), 12);
        assert_eq!(theme.max_gap().round_i32(), 80);
    }
}
