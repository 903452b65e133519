use crate::canvas::Overlay;
use crate::content::Branding;
use crate::font::{FontLibrary, FontRole};
use crate::style::{CanvasSpec, Theme};
use crate::types::{Px, Rect};

const ICON_SIZE: i32 = 22;
const SEGMENT_GAP: i32 = 10;
const SHADOW_OFFSET: i32 = 2;
const SEPARATOR: &str = "  \u{2022}  ";

/// Draws the branding strip at the bottom of the canvas: social icons, the
/// handle, and the website, centered as one row. Footer text keeps its base
/// size regardless of the content font scale. Nothing is drawn when both
/// branding fields are blank.
pub fn draw_footer(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    branding: &Branding,
) {
    if branding.is_empty() {
        return;
    }

    let size = theme.footer_size;
    let icon_size = Px::from_i32(ICON_SIZE);
    let gap = Px::from_i32(SEGMENT_GAP);
    let handle = branding.handle.trim();
    let website = branding.website.trim();

    let handle_width = if branding.has_handle() {
        fonts.measure(FontRole::Footer, size, handle)
    } else {
        Px::ZERO
    };
    let sep_width = if branding.has_handle() && branding.has_website() {
        fonts.measure(FontRole::Footer, size, SEPARATOR)
    } else {
        Px::ZERO
    };
    let website_width = if branding.has_website() {
        fonts.measure(FontRole::Footer, size, website)
    } else {
        Px::ZERO
    };

    // Two social icons always lead the row; the globe closes it.
    let mut total_width = icon_size + gap + icon_size + gap;
    if branding.has_handle() {
        total_width += handle_width + gap;
    }
    if branding.has_handle() && branding.has_website() {
        total_width += sep_width + gap;
    }
    if branding.has_website() {
        total_width += icon_size + gap + website_width;
    } else {
        total_width += icon_size;
    }
    let total_width = total_width.min(canvas.content_width());

    let text_top = canvas.height - canvas.footer_height + Px::from_i32(50);
    let icon_top = text_top + size / 2 - icon_size / 2;
    let start_x = ((canvas.width - total_width) / 2).max(canvas.margin_x);
    let mut x = start_x;

    overlay.set_font(FontRole::Footer, size);
    overlay.set_stroke_color(theme.footer_color);

    draw_linkedin_icon(overlay, fonts, theme, x, icon_top, icon_size);
    x += icon_size + gap;

    draw_camera_icon(overlay, theme, x, icon_top, icon_size);
    x += icon_size + gap;

    if branding.has_handle() {
        shadowed_text(overlay, theme, x, text_top, handle);
        x += handle_width + gap;
    }

    if branding.has_handle() && branding.has_website() {
        shadowed_text(overlay, theme, x, text_top, SEPARATOR);
        x += sep_width + gap;
    }

    draw_globe_icon(overlay, x, icon_top, icon_size);
    x += icon_size + gap;

    if branding.has_website() {
        shadowed_text(overlay, theme, x, text_top, website);
    }
}

fn shadowed_text(overlay: &mut Overlay, theme: &Theme, x: Px, y: Px, text: &str) {
    let offset = Px::from_i32(SHADOW_OFFSET);
    overlay.set_fill_color(theme.footer_shadow);
    overlay.draw_text(x + offset, y + offset, text);
    overlay.set_fill_color(theme.footer_color);
    overlay.draw_text(x, y, text);
}

fn icon_stroke_width(size: Px) -> Px {
    (size / 10).max(Px::from_i32(2))
}

/// Outlined rounded square with a bold "in" inside.
fn draw_linkedin_icon(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    x: Px,
    y: Px,
    size: Px,
) {
    overlay.set_line_width(icon_stroke_width(size));
    overlay.stroke_round_rect(
        Rect {
            x,
            y,
            width: size,
            height: size,
        },
        size / 4,
    );

    let label_size = size.mul_ratio(13, 20);
    let label_width = fonts.measure(FontRole::Heading, label_size, "in");
    overlay.set_font(FontRole::Heading, label_size);
    overlay.set_fill_color(theme.footer_color);
    overlay.draw_text(
        x + size / 2 - label_width / 2,
        y + size / 2 - label_size / 2,
        "in",
    );
    overlay.set_font(FontRole::Footer, theme.footer_size);
}

/// Camera outline: rounded body, lens circle, flash dot top-right.
fn draw_camera_icon(overlay: &mut Overlay, theme: &Theme, x: Px, y: Px, size: Px) {
    overlay.set_line_width(icon_stroke_width(size));
    overlay.stroke_round_rect(
        Rect {
            x,
            y,
            width: size,
            height: size,
        },
        size / 4,
    );
    let cx = x + size / 2;
    let cy = y + size / 2;
    overlay.stroke_circle(cx, cy, size / 4);
    overlay.set_fill_color(theme.footer_color);
    overlay.fill_circle(x + size - size / 4, y + size / 4, size / 10);
}

/// Globe outline: circle, equator line, meridian ellipse.
fn draw_globe_icon(overlay: &mut Overlay, x: Px, y: Px, size: Px) {
    overlay.set_line_width(icon_stroke_width(size));
    let cx = x + size / 2;
    let cy = y + size / 2;
    let radius = size / 2 - Px::from_i32(1);
    overlay.stroke_circle(cx, cy, radius);
    overlay.stroke_line(x + Px::from_i32(2), cy, x + size - Px::from_i32(2), cy);
    overlay.stroke_ellipse(cx, cy, radius / 2, radius);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;

    fn record(branding: &Branding) -> Vec<Command> {
        let fonts = FontLibrary::approximate();
        let theme = Theme::default();
        let canvas = CanvasSpec::default();
        let mut overlay = Overlay::new();
        draw_footer(&mut overlay, &fonts, &theme, &canvas, branding);
        overlay.finish()
    }

    fn texts(commands: &[Command]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_branding_draws_nothing() {
        assert!(record(&Branding::default()).is_empty());
        assert!(record(&Branding::new("   ", "")).is_empty());
    }

    #[test]
    fn full_branding_draws_separator_between_handle_and_website() {
        let commands = record(&Branding::new("@maria", "maria.dev"));
        let texts = texts(&commands);
        // Shadow pass doubles every footer string.
        assert_eq!(texts.iter().filter(|t| **t == "@maria").count(), 2);
        assert_eq!(texts.iter().filter(|t| **t == SEPARATOR).count(), 2);
        assert_eq!(texts.iter().filter(|t| **t == "maria.dev").count(), 2);
    }

    #[test]
    fn missing_handle_omits_separator_and_keeps_row_inside_margins() {
        // A blank handle must not leave a stray separator or leading gap.
        let canvas = CanvasSpec::default();
        let commands = record(&Branding::new("", "maria.dev"));
        let texts = texts(&commands);
        assert!(!texts.contains(&SEPARATOR));
        assert!(texts.contains(&"maria.dev"));

        for cmd in &commands {
            if let Command::DrawText { x, .. } = cmd {
                assert!(*x >= canvas.margin_x);
                assert!(*x <= canvas.width - canvas.margin_x);
            }
        }
    }

    #[test]
    fn icons_are_recorded_for_any_nonempty_branding() {
        let commands = record(&Branding::new("@a", ""));
        let round_rects = commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::StrokeRoundRect { .. }))
            .count();
        let circles = commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::StrokeCircle { .. }))
            .count();
        let ellipses = commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::StrokeEllipse { .. }))
            .count();
        // Two rounded squares, lens + globe circles, one meridian.
        assert_eq!(round_rects, 2);
        assert_eq!(circles, 2);
        assert_eq!(ellipses, 1);
    }

    #[test]
    fn footer_text_sits_inside_the_footer_strip() {
        let canvas = CanvasSpec::default();
        let commands = record(&Branding::new("@maria", "maria.dev"));
        for cmd in &commands {
            if let Command::DrawText { y, .. } = cmd {
                assert!(*y >= canvas.height - canvas.footer_height);
                assert!(*y < canvas.height);
            }
        }
    }
}
