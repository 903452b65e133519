use crate::canvas::Overlay;
use crate::content::{Content, ContentBlock, Section, Template};
use crate::font::{FontLibrary, FontRole};
use crate::layout::{self, LayoutPlan};
use crate::measure::wrap;
use crate::style::{CanvasSpec, Theme};
use crate::types::{Px, Rect};

pub const CHECKLIST_MAX_ITEMS: usize = 8;
pub const COMPARISON_MAX_BULLETS: usize = 4;

/// What a template drew, surfaced through [`crate::RenderResult`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateStats {
    pub font_scale: f32,
    pub blocks_rendered: usize,
    pub blocks_dropped: usize,
}

/// Dispatches to the template-specific drawing routine. All templates share
/// the measurement, scaling and footer-safety primitives; only the geometry
/// differs.
pub fn draw(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    content: &Content,
    template: Template,
) -> TemplateStats {
    match template {
        Template::MultiSection => draw_multi_section(overlay, fonts, theme, canvas, content),
        Template::Checklist => draw_checklist(overlay, fonts, theme, canvas, content),
        Template::Quote => draw_quote(overlay, fonts, theme, canvas, content),
        Template::Comparison => draw_comparison(overlay, fonts, theme, canvas, content),
    }
}

/// Card rectangle around content starting at `y` with inner `height`. The
/// pad extends above and to both sides; the bottom edge sits at `y + height`
/// because block heights already include their bottom padding.
fn card_rect(canvas: &CanvasSpec, y: Px, height: Px, pad: Px) -> Rect {
    Rect {
        x: canvas.margin_x - pad,
        y: y - pad,
        width: canvas.content_width() + pad * 2,
        height: height + pad,
    }
}

fn fill_card(overlay: &mut Overlay, theme: &Theme, canvas: &CanvasSpec, y: Px, height: Px, pad: Px, header_style: bool) {
    let fill = if header_style {
        theme.header_card_fill
    } else {
        theme.section_card_fill
    };
    overlay.set_fill_color(fill);
    overlay.fill_round_rect(card_rect(canvas, y, height, pad), theme.card_radius);
}

/// Title lines get a soft drop shadow so the header stays legible on busy
/// backgrounds.
fn shadowed_line(overlay: &mut Overlay, theme: &Theme, x: Px, y: Px, text: &str) {
    let offset = Px::from_i32(2);
    overlay.set_fill_color(theme.footer_shadow);
    overlay.draw_text(x + offset, y + offset, text);
    overlay.set_fill_color(theme.title_color);
    overlay.draw_text(x, y, text);
}

/// Default layout: header card, one card per section, takeaway card. Runs
/// the full solve/allocate/guard pipeline, then draws the surviving blocks.
fn draw_multi_section(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    content: &Content,
) -> TemplateStats {
    let blocks = content.to_blocks();
    let plan = layout::plan(fonts, theme, canvas, &blocks);
    let s = plan.font_scale;

    let mut y = canvas.margin_y;
    for planned in &plan.blocks {
        let block = &blocks[planned.index];
        match block {
            ContentBlock::Header { title, subtitle } => {
                draw_header(overlay, fonts, theme, canvas, y, planned.height, s, title, subtitle.as_deref());
            }
            ContentBlock::Section(section) => {
                draw_section(overlay, fonts, theme, canvas, y, planned.height, s, section);
            }
            ContentBlock::Takeaway { text } => {
                draw_takeaway(overlay, fonts, theme, canvas, y, planned.height, s, text);
            }
        }
        y += planned.height + plan.gap;
    }

    stats_from_plan(&plan)
}

fn stats_from_plan(plan: &LayoutPlan) -> TemplateStats {
    TemplateStats {
        font_scale: plan.font_scale,
        blocks_rendered: plan.blocks.len(),
        blocks_dropped: plan.dropped,
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_header(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    y: Px,
    height: Px,
    s: f32,
    title: &str,
    subtitle: Option<&str>,
) {
    fill_card(overlay, theme, canvas, y, height, theme.header_card_padding.scaled(s), true);

    let wrap_width = canvas.content_width() - Px::from_i32(40);
    let title_size = theme.title_size.scaled(s);
    let mut cursor = y;

    overlay.set_font(FontRole::Title, title_size);
    for line in wrap(fonts, FontRole::Title, title_size, title, wrap_width) {
        shadowed_line(overlay, theme, canvas.margin_x, cursor, &line);
        cursor += theme.title_line_height.scaled(s);
    }

    if let Some(subtitle) = subtitle {
        cursor += Px::from_i32(10).scaled(s);
        let subtitle_size = theme.subtitle_size.scaled(s);
        overlay.set_font(FontRole::Subtitle, subtitle_size);
        overlay.set_fill_color(theme.subtitle_color);
        for line in wrap(fonts, FontRole::Subtitle, subtitle_size, subtitle, wrap_width) {
            overlay.draw_text(canvas.margin_x, cursor, &line);
            cursor += theme.subtitle_line_height.scaled(s);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_section(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    y: Px,
    height: Px,
    s: f32,
    section: &Section,
) {
    fill_card(overlay, theme, canvas, y, height, theme.section_card_padding.scaled(s), false);

    let mut cursor = y;
    match &section.heading {
        Some(heading) => {
            let heading_size = theme.heading_size.scaled(s);
            overlay.set_font(FontRole::Heading, heading_size);
            overlay.set_fill_color(theme.accent_color);
            overlay.draw_text(
                canvas.margin_x + Px::from_i32(8).scaled(s),
                cursor + Px::from_i32(8).scaled(s),
                heading,
            );
            cursor += theme.heading_line_height.scaled(s);
        }
        None => cursor += Px::from_i32(10).scaled(s),
    }

    let body_size = theme.body_size.scaled(s);
    let bullet_wrap = canvas.content_width() - Px::from_i32(80);
    overlay.set_font(FontRole::Body, body_size);
    for bullet in &section.bullets {
        overlay.set_fill_color(theme.bullet_color);
        overlay.draw_text(canvas.margin_x + Px::from_i32(16).scaled(s), cursor, "\u{2022}");

        overlay.set_fill_color(theme.body_color);
        for line in wrap(fonts, FontRole::Body, body_size, bullet, bullet_wrap) {
            overlay.draw_text(canvas.margin_x + Px::from_i32(40).scaled(s), cursor, &line);
            cursor += theme.bullet_line_height.scaled(s);
        }
        cursor += theme.bullet_spacing.scaled(s);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_takeaway(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    y: Px,
    height: Px,
    s: f32,
    text: &str,
) {
    // Header card fill for emphasis.
    fill_card(overlay, theme, canvas, y, height, theme.section_card_padding.scaled(s), true);

    let size = theme.heading_size.scaled(s);
    let wrap_width = canvas.content_width() - Px::from_i32(60);
    let mut cursor = y;
    overlay.set_font(FontRole::Heading, size);
    overlay.set_fill_color(theme.title_color);
    for line in wrap(fonts, FontRole::Heading, size, text, wrap_width) {
        overlay.draw_text(
            canvas.margin_x + Px::from_i32(8).scaled(s),
            cursor + Px::from_i32(10).scaled(s),
            &line,
        );
        cursor += theme.takeaway_line_height.scaled(s);
    }
}

/// Header followed by a flat check-glyph list of every bullet across all
/// sections. Section headings are dropped; at most eight items render.
fn draw_checklist(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    content: &Content,
) -> TemplateStats {
    let item_line_height = Px::from_i32(36);
    let item_spacing = Px::from_i32(10);
    let wrap_width = canvas.content_width() - Px::from_i32(60);
    let header_wrap = canvas.content_width() - Px::from_i32(40);
    let boundary = canvas.max_content_y();

    let mut y = canvas.margin_y;

    let title_lines = wrap(fonts, FontRole::Title, theme.title_size, &content.title, header_wrap);
    let header_height =
        theme.title_line_height * title_lines.len() as i32 + Px::from_i32(40);
    fill_card(overlay, theme, canvas, y, header_height, theme.header_card_padding, true);

    overlay.set_font(FontRole::Title, theme.title_size);
    for line in &title_lines {
        shadowed_line(overlay, theme, canvas.margin_x, y, line);
        y += theme.title_line_height;
    }

    if let Some(subtitle) = &content.subtitle {
        y += Px::from_i32(10);
        overlay.set_font(FontRole::Subtitle, theme.subtitle_size);
        overlay.set_fill_color(theme.subtitle_color);
        for line in wrap(fonts, FontRole::Subtitle, theme.subtitle_size, subtitle, header_wrap) {
            overlay.draw_text(canvas.margin_x, y, &line);
            y += theme.subtitle_line_height;
        }
    }

    y += Px::from_i32(30);

    let items: Vec<&String> = content
        .sections
        .iter()
        .flat_map(|section| section.bullets.iter())
        .take(CHECKLIST_MAX_ITEMS)
        .collect();
    let capped = items.len();

    overlay.set_font(FontRole::Body, theme.body_size);
    overlay.set_fill_color(theme.body_color);
    let mut rendered = 0usize;
    for item in &items {
        if y + Px::from_i32(50) > boundary {
            log::debug!("checklist item {} skipped at y={}", rendered, y.round_i32());
            break;
        }
        let line_text = format!("\u{2713} {item}");
        for line in wrap(fonts, FontRole::Body, theme.body_size, &line_text, wrap_width) {
            overlay.draw_text(canvas.margin_x + Px::from_i32(24), y, &line);
            y += item_line_height;
        }
        y += item_spacing;
        rendered += 1;
    }

    TemplateStats {
        font_scale: 1.0,
        blocks_rendered: 1 + rendered,
        blocks_dropped: capped - rendered,
    }
}

/// Single large blockquote, vertically centered above the footer. The
/// takeaway is quoted when present, otherwise the title; the subtitle
/// becomes an attribution line.
fn draw_quote(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    content: &Content,
) -> TemplateStats {
    let quote_size = Px::from_i32(48);
    let quote_line_height = Px::from_i32(60);
    let wrap_width = canvas.content_width() - Px::from_i32(80);

    let source = content.takeaway.as_deref().unwrap_or(&content.title);
    let quoted = format!("\u{201c}{source}\u{201d}");
    let lines = wrap(fonts, FontRole::Title, quote_size, &quoted, wrap_width);

    let total_height = quote_line_height * lines.len() as i32;
    let mut y = (canvas.height - canvas.footer_height - total_height) / 2;

    fill_card(
        overlay,
        theme,
        canvas,
        y - Px::from_i32(20),
        total_height + Px::from_i32(80),
        Px::from_i32(30),
        true,
    );

    overlay.set_font(FontRole::Title, quote_size);
    let text_x = canvas.margin_x + Px::from_i32(20);
    for line in &lines {
        shadowed_line(overlay, theme, text_x, y, line);
        y += quote_line_height;
    }

    if let Some(subtitle) = &content.subtitle {
        overlay.set_font(FontRole::Subtitle, theme.subtitle_size);
        overlay.set_fill_color(theme.subtitle_color);
        overlay.draw_text(text_x, y + Px::from_i32(10), format!("\u{2014} {subtitle}"));
    }

    TemplateStats {
        font_scale: 1.0,
        blocks_rendered: 1,
        blocks_dropped: 0,
    }
}

/// Header card, then the first two sections side by side in equal columns.
/// A single section fills only the left column; sections past the second
/// are ignored.
fn draw_comparison(
    overlay: &mut Overlay,
    fonts: &FontLibrary,
    theme: &Theme,
    canvas: &CanvasSpec,
    content: &Content,
) -> TemplateStats {
    let title_size = Px::from_i32(48);
    let title_line_height = Px::from_i32(56);
    let heading_size = Px::from_i32(32);
    let body_size = Px::from_i32(26);
    let body_line_height = Px::from_i32(32);
    let header_wrap = canvas.content_width() - Px::from_i32(40);
    let boundary = canvas.max_content_y();

    let mut y = canvas.margin_y;

    let title_lines = wrap(fonts, FontRole::Title, title_size, &content.title, header_wrap);
    let header_height = title_line_height * title_lines.len() as i32 + Px::from_i32(30);
    fill_card(overlay, theme, canvas, y, header_height, theme.header_card_padding, true);

    overlay.set_font(FontRole::Title, title_size);
    for line in &title_lines {
        shadowed_line(overlay, theme, canvas.margin_x, y, line);
        y += title_line_height;
    }
    y += Px::from_i32(40);

    let columns: Vec<&Section> = content.sections.iter().take(2).collect();
    if columns.is_empty() {
        return TemplateStats {
            font_scale: 1.0,
            blocks_rendered: 1,
            blocks_dropped: 0,
        };
    }

    let col_width = (canvas.content_width() - Px::from_i32(40)) / 2;
    let max_items = columns
        .iter()
        .map(|section| section.bullets.len().min(COMPARISON_MAX_BULLETS))
        .max()
        .unwrap_or(0);
    let panel_height = Px::from_i32(50) + Px::from_i32(80) * max_items as i32;

    if y + panel_height >= boundary {
        log::debug!("comparison panel skipped: would cross the footer boundary");
        return TemplateStats {
            font_scale: 1.0,
            blocks_rendered: 1,
            blocks_dropped: columns.len(),
        };
    }

    fill_card(overlay, theme, canvas, y, panel_height, Px::from_i32(20), false);

    for (col, section) in columns.iter().enumerate() {
        let x = canvas.margin_x + (col_width + Px::from_i32(30)) * col as i32;
        let mut col_y = y;

        if let Some(heading) = &section.heading {
            overlay.set_font(FontRole::Heading, heading_size);
            overlay.set_fill_color(theme.accent_color);
            overlay.draw_text(x, col_y, heading);
        }
        col_y += Px::from_i32(40);

        overlay.set_font(FontRole::Body, body_size);
        overlay.set_fill_color(theme.body_color);
        for bullet in section.bullets.iter().take(COMPARISON_MAX_BULLETS) {
            for line in wrap(fonts, FontRole::Body, body_size, bullet, col_width - Px::from_i32(20)) {
                if col_y + body_line_height > boundary {
                    break;
                }
                overlay.draw_text(x, col_y, &line);
                col_y += body_line_height;
            }
        }
    }

    TemplateStats {
        font_scale: 1.0,
        blocks_rendered: 1 + columns.len(),
        blocks_dropped: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;

    fn fixtures() -> (FontLibrary, Theme, CanvasSpec) {
        (
            FontLibrary::approximate(),
            Theme::default(),
            CanvasSpec::default(),
        )
    }

    fn record(content: &Content, template: Template) -> (Vec<Command>, TemplateStats) {
        let (fonts, theme, canvas) = fixtures();
        let mut overlay = Overlay::new();
        let stats = draw(&mut overlay, &fonts, &theme, &canvas, content, template);
        (overlay.finish(), stats)
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

    // Wrapping splits long fixtures across several DrawText lines; joining
    // them restores the original word sequence for containment checks.
    fn joined_text(commands: &[Command]) -> String {
        texts(commands).join(" ")
    }

    fn sample_sections() -> Vec<Section> {
        vec![
            Section::new(
                Some("Before".to_string()),
                vec!["slow manual builds".to_string(), "flaky deploys".to_string()],
            ),
            Section::new(
                Some("After".to_string()),
                vec!["one-step release".to_string()],
            ),
        ]
    }

    #[test]
    fn multi_section_draws_cards_and_all_text() {
        let content = Content::new("Ship Faster")
            .subtitle("lessons from a year of releases")
            .section(sample_sections()[0].clone())
            .takeaway("Automate the boring half first");
        let (commands, stats) = record(&content, Template::MultiSection);

        let cards = commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::FillRoundRect { .. }))
            .count();
        // Header, one section, takeaway.
        assert_eq!(cards, 3);
        assert_eq!(stats.blocks_rendered, 3);
        assert_eq!(stats.blocks_dropped, 0);
        assert_eq!(stats.font_scale, 1.0);

        let joined = joined_text(&commands);
        assert!(joined.contains("Ship Faster"));
        assert!(joined.contains("lessons from a year of releases"));
        assert!(joined.contains("slow manual builds"));
        assert!(joined.contains("Automate the boring half first"));
        // A bullet glyph per bullet point.
        let texts = texts(&commands);
        assert_eq!(texts.iter().filter(|t| **t == "\u{2022}").count(), 2);
    }

    #[test]
    fn multi_section_blocks_stay_above_the_footer() {
        let (_, _, canvas) = fixtures();
        let content = Content::new("Title")
            .section(sample_sections()[0].clone())
            .section(sample_sections()[1].clone());
        let (commands, _) = record(&content, Template::MultiSection);
        for cmd in &commands {
            if let Command::DrawText { y, .. } = cmd {
                assert!(*y < canvas.max_content_y());
            }
        }
    }

    #[test]
    fn checklist_flattens_bullets_and_drops_headings() {
        let content = Content::new("Release Checklist")
            .section(sample_sections()[0].clone())
            .section(sample_sections()[1].clone());
        let (commands, stats) = record(&content, Template::Checklist);
        let texts = texts(&commands);

        assert!(texts.iter().any(|t| t.starts_with("\u{2713} slow manual builds")));
        assert!(texts.iter().any(|t| t.starts_with("\u{2713} one-step release")));
        assert!(!texts.contains(&"Before"));
        assert!(!texts.contains(&"After"));
        assert_eq!(stats.blocks_rendered, 1 + 3);
    }

    #[test]
    fn checklist_caps_at_eight_items() {
        let mut content = Content::new("Long List");
        for i in 0..3 {
            content = content.section(Section::new(
                None,
                (0..3).map(|j| format!("item {i}-{j}")).collect(),
            ));
        }
        let (commands, stats) = record(&content, Template::Checklist);
        let checked = texts(&commands)
            .iter()
            .filter(|t| t.starts_with('\u{2713}'))
            .count();
        assert!(checked <= CHECKLIST_MAX_ITEMS);
        assert!(stats.blocks_rendered <= 1 + CHECKLIST_MAX_ITEMS);
    }

    #[test]
    fn quote_prefers_takeaway_and_centers_it() {
        let (_, _, canvas) = fixtures();
        let content = Content::new("Ignored Title")
            .subtitle("Grace Hopper")
            .takeaway("A ship in port is safe");
        let (commands, stats) = record(&content, Template::Quote);
        let joined = joined_text(&commands);

        // The quote wraps across lines at this size; the word sequence
        // survives intact and the title never appears.
        assert!(joined.contains("A ship in port is safe"));
        assert!(!joined.contains("Ignored Title"));
        assert!(
            texts(&commands)
                .iter()
                .any(|t| t.starts_with('\u{2014}'))
        );
        assert_eq!(stats.blocks_rendered, 1);

        // The quote body sits in the middle band of the canvas.
        let quote_y = commands
            .iter()
            .find_map(|cmd| match cmd {
                Command::DrawText { y, text, .. } if text.contains("ship") => Some(*y),
                _ => None,
            })
            .unwrap();
        assert!(quote_y > canvas.height / 4);
        assert!(quote_y < canvas.height.mul_ratio(3, 4));
    }

    #[test]
    fn quote_falls_back_to_the_title() {
        let content = Content::new("Just a Title");
        let (commands, _) = record(&content, Template::Quote);
        assert!(
            texts(&commands)
                .iter()
                .any(|t| t.contains("Just a Title"))
        );
    }

    #[test]
    fn comparison_renders_two_columns() {
        let content = Content::new("Before vs After")
            .section(sample_sections()[0].clone())
            .section(sample_sections()[1].clone());
        let (commands, stats) = record(&content, Template::Comparison);
        let texts = texts(&commands);
        let joined = joined_text(&commands);

        assert!(texts.contains(&"Before"));
        assert!(texts.contains(&"After"));
        // Column width forces multi-line bullets; every word still lands.
        assert!(joined.contains("slow manual builds"));
        assert!(joined.contains("one-step release"));
        assert_eq!(stats.blocks_rendered, 3);
    }

    #[test]
    fn comparison_with_one_section_fills_only_the_left_column() {
        // A single section is not an error; the right column stays empty.
        let (_, _, canvas) = fixtures();
        let content = Content::new("Halfway There").section(sample_sections()[0].clone());
        let (commands, stats) = record(&content, Template::Comparison);
        assert_eq!(stats.blocks_rendered, 2);

        let col_width = (canvas.content_width() - Px::from_i32(40)) / 2;
        let right_x = canvas.margin_x + col_width + Px::from_i32(30);
        for cmd in &commands {
            if let Command::DrawText { x, .. } = cmd {
                assert!(*x < right_x, "text drawn in the empty right column");
            }
        }
    }

    #[test]
    fn comparison_ignores_sections_past_the_second() {
        let content = Content::new("Three Way")
            .section(sample_sections()[0].clone())
            .section(sample_sections()[1].clone())
            .section(Section::new(
                Some("Extra".to_string()),
                vec!["never shown".to_string()],
            ));
        let (commands, _) = record(&content, Template::Comparison);
        let texts = texts(&commands);
        assert!(!texts.contains(&"Extra"));
        assert!(!texts.contains(&"never shown"));
    }
}
