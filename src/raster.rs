use crate::canvas::Command;
use crate::error::PlacardError;
use crate::font::{FontLibrary, FontRole};
use crate::style::CanvasSpec;
use crate::types::{Color, Px, Rect};
use image::RgbImage;
use rustybuzz::{Face as HbFace, UnicodeBuffer};
use tiny_skia::{
    FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};
use ttf_parser::{GlyphId, OutlineBuilder};

#[derive(Clone)]
struct RasterState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Px,
    font_role: FontRole,
    font_size: Px,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: Px::from_i32(1),
            font_role: FontRole::Body,
            font_size: Px::from_i32(12),
        }
    }
}

/// Replays recorded overlay commands directly onto the background pixmap.
/// tiny-skia blends in premultiplied alpha, so drawing onto the background
/// is equivalent to compositing a separate transparent overlay.
pub(crate) fn replay(pixmap: &mut Pixmap, commands: &[Command], fonts: &FontLibrary) {
    let mut state = RasterState::default();
    for cmd in commands {
        match cmd {
            Command::SetFillColor(color) => state.fill_color = *color,
            Command::SetStrokeColor(color) => state.stroke_color = *color,
            Command::SetLineWidth(width) => state.line_width = (*width).max(Px::ZERO),
            Command::SetFont { role, size } => {
                state.font_role = *role;
                state.font_size = *size;
            }
            Command::FillRoundRect { rect, radius } => {
                if let Some(path) = round_rect_path(*rect, *radius) {
                    fill(pixmap, &path, state.fill_color);
                }
            }
            Command::StrokeRoundRect { rect, radius } => {
                if let Some(path) = round_rect_path(*rect, *radius) {
                    stroke(pixmap, &path, &state);
                }
            }
            Command::FillCircle { cx, cy, radius } => {
                let mut builder = PathBuilder::new();
                builder.push_circle(cx.to_f32(), cy.to_f32(), radius.to_f32().max(0.1));
                if let Some(path) = builder.finish() {
                    fill(pixmap, &path, state.fill_color);
                }
            }
            Command::StrokeCircle { cx, cy, radius } => {
                let mut builder = PathBuilder::new();
                builder.push_circle(cx.to_f32(), cy.to_f32(), radius.to_f32().max(0.1));
                if let Some(path) = builder.finish() {
                    stroke(pixmap, &path, &state);
                }
            }
            Command::StrokeEllipse { cx, cy, rx, ry } => {
                let rx = rx.to_f32().max(0.1);
                let ry = ry.to_f32().max(0.1);
                let oval =
                    tiny_skia::Rect::from_xywh(cx.to_f32() - rx, cy.to_f32() - ry, rx * 2.0, ry * 2.0);
                if let Some(oval) = oval {
                    let mut builder = PathBuilder::new();
                    builder.push_oval(oval);
                    if let Some(path) = builder.finish() {
                        stroke(pixmap, &path, &state);
                    }
                }
            }
            Command::StrokeLine { x1, y1, x2, y2 } => {
                let mut builder = PathBuilder::new();
                builder.move_to(x1.to_f32(), y1.to_f32());
                builder.line_to(x2.to_f32(), y2.to_f32());
                if let Some(path) = builder.finish() {
                    stroke(pixmap, &path, &state);
                }
            }
            Command::DrawText { x, y, text } => {
                draw_text_line(pixmap, fonts, &state, *x, *y, text);
            }
        }
    }
}

fn fill(pixmap: &mut Pixmap, path: &Path, color: Color) {
    let paint = fill_paint(color);
    pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
}

fn stroke(pixmap: &mut Pixmap, path: &Path, state: &RasterState) {
    let paint = fill_paint(state.stroke_color);
    let stroke = Stroke {
        width: state.line_width.to_f32().max(0.1),
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
}

fn fill_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_sk_color(color));
    paint.anti_alias = true;
    paint
}

fn to_sk_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        color.a.clamp(0.0, 1.0),
    )
    .unwrap_or_else(|| tiny_skia::Color::from_rgba8(0, 0, 0, 255))
}

/// Rounded rectangle outline via cubic corner arcs.
fn round_rect_path(rect: Rect, radius: Px) -> Option<Path> {
    let x = rect.x.to_f32();
    let y = rect.y.to_f32();
    let w = rect.width.to_f32();
    let h = rect.height.to_f32();
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.to_f32().max(0.0).min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        let rect = tiny_skia::Rect::from_xywh(x, y, w, h)?;
        return Some(PathBuilder::from_rect(rect));
    }
    // Circle-to-cubic constant.
    let k = 0.552_284_8 * r;

    let mut b = PathBuilder::new();
    b.move_to(x + r, y);
    b.line_to(x + w - r, y);
    b.cubic_to(x + w - r + k, y, x + w, y + r - k, x + w, y + r);
    b.line_to(x + w, y + h - r);
    b.cubic_to(x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h);
    b.line_to(x + r, y + h);
    b.cubic_to(x + r - k, y + h, x, y + h - r + k, x, y + h - r);
    b.line_to(x, y + r);
    b.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    b.close();
    b.finish()
}

struct GlyphOutline {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphOutline {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

// Font outlines are y-up; the canvas is y-down, so glyph y is negated
// around the baseline origin.
impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder
            .move_to(self.origin_x + x * self.scale, self.origin_y - y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder
            .line_to(self.origin_x + x * self.scale, self.origin_y - y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x2 * self.scale,
            self.origin_y - y2 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Shapes one line with rustybuzz and fills glyph outlines. Without a loaded
/// face (metrics-only library) text is skipped; layout geometry is still
/// exercised by the cards and icons around it.
fn draw_text_line(
    pixmap: &mut Pixmap,
    fonts: &FontLibrary,
    state: &RasterState,
    x: Px,
    y: Px,
    text: &str,
) {
    let font_size = state.font_size.to_f32();
    if font_size <= 0.0 || text.is_empty() {
        return;
    }
    let Some(data) = fonts.face_data(state.font_role) else {
        return;
    };
    let Ok(face) = ttf_parser::Face::parse(data, 0) else {
        return;
    };
    let Some(hb_face) = HbFace::from_slice(data, 0) else {
        return;
    };

    let upem = face.units_per_em().max(1) as f32;
    let scale = font_size / upem;
    let baseline_y = y.to_f32() + fonts.ascent(state.font_role, state.font_size).to_f32();
    let paint = fill_paint(state.fill_color);

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    let shaped = rustybuzz::shape(&hb_face, &[], buffer);

    let mut pen_x = x.to_f32();
    for (info, pos) in shaped
        .glyph_infos()
        .iter()
        .zip(shaped.glyph_positions().iter())
    {
        let origin_x = pen_x + pos.x_offset as f32 * scale;
        let origin_y = baseline_y - pos.y_offset as f32 * scale;
        let mut outline = GlyphOutline::new(origin_x, origin_y, scale);
        if face
            .outline_glyph(GlyphId(info.glyph_id as u16), &mut outline)
            .is_some()
        {
            if let Some(path) = outline.finish() {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        pen_x += pos.x_advance as f32 * scale;
    }
}

/// Decodes the background, resizes it to the canvas if the generator
/// returned slightly different dimensions, and premultiplies into a pixmap.
pub(crate) fn decode_background(
    bytes: &[u8],
    canvas: &CanvasSpec,
) -> Result<Pixmap, PlacardError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| PlacardError::Asset(format!("cannot decode background image: {err}")))?;
    let mut rgba = decoded.to_rgba8();

    let width = canvas.width.round_i32().max(1) as u32;
    let height = canvas.height.round_i32().max(1) as u32;
    if rgba.dimensions() != (width, height) {
        rgba = image::imageops::resize(
            &rgba,
            width,
            height,
            image::imageops::FilterType::Lanczos3,
        );
    }

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        PlacardError::InvalidConfiguration(format!("invalid raster size {width}x{height}"))
    })?;
    let src = rgba.as_raw();
    let dst = pixmap.data_mut();
    for (src_px, dst_px) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = src_px[3];
        dst_px[0] = premul_u8(src_px[0], a);
        dst_px[1] = premul_u8(src_px[1], a);
        dst_px[2] = premul_u8(src_px[2], a);
        dst_px[3] = a;
    }
    Ok(pixmap)
}

fn premul_u8(channel: u8, alpha: u8) -> u8 {
    let prod = (channel as u16) * (alpha as u16) + 127;
    ((prod + (prod >> 8)) >> 8) as u8
}

fn demul_u8(channel: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }
    let value = (channel as u16 * 255 + (alpha as u16 / 2)) / alpha as u16;
    value.min(255) as u8
}

/// Flattens the composited pixmap to an opaque RGB PNG.
pub(crate) fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, PlacardError> {
    let width = pixmap.width();
    let height = pixmap.height();
    let mut rgb = RgbImage::new(width, height);
    for (pixel, src) in rgb.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        let a = src[3];
        pixel.0 = [demul_u8(src[0], a), demul_u8(src[1], a), demul_u8(src[2], a)];
    }
    let mut bytes = Vec::new();
    rgb.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .map_err(|err| PlacardError::InvalidConfiguration(format!("png encode failed: {err}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn blank_pixmap(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(10, 20, 30, 255));
        pixmap
    }

    fn count_changed(pixmap: &Pixmap) -> usize {
        pixmap
            .data()
            .chunks_exact(4)
            .filter(|px| px[..3] != premultiplied_base()[..3])
            .count()
    }

    fn premultiplied_base() -> [u8; 4] {
        [10, 20, 30, 255]
    }

    #[test]
    fn fill_round_rect_touches_pixels_inside_not_corners() {
        let mut pixmap = blank_pixmap(100, 100);
        let fonts = FontLibrary::approximate();
        let commands = vec![
            Command::SetFillColor(Color::WHITE),
            Command::FillRoundRect {
                rect: Rect {
                    x: Px::from_i32(10),
                    y: Px::from_i32(10),
                    width: Px::from_i32(80),
                    height: Px::from_i32(80),
                },
                radius: Px::from_i32(24),
            },
        ];
        replay(&mut pixmap, &commands, &fonts);
        assert!(count_changed(&pixmap) > 0);

        // Center is white, the square corner of the rect stays background.
        let center = pixmap.pixel(50, 50).unwrap();
        assert_eq!((center.red(), center.green(), center.blue()), (255, 255, 255));
        let corner = pixmap.pixel(11, 11).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue()), (10, 20, 30));
    }

    #[test]
    fn stroke_commands_draw_without_fonts() {
        let mut pixmap = blank_pixmap(60, 60);
        let fonts = FontLibrary::approximate();
        let commands = vec![
            Command::SetStrokeColor(Color::WHITE),
            Command::SetLineWidth(Px::from_i32(3)),
            Command::StrokeCircle {
                cx: Px::from_i32(30),
                cy: Px::from_i32(30),
                radius: Px::from_i32(20),
            },
            Command::StrokeLine {
                x1: Px::from_i32(5),
                y1: Px::from_i32(30),
                x2: Px::from_i32(55),
                y2: Px::from_i32(30),
            },
            Command::StrokeEllipse {
                cx: Px::from_i32(30),
                cy: Px::from_i32(30),
                rx: Px::from_i32(10),
                ry: Px::from_i32(20),
            },
        ];
        replay(&mut pixmap, &commands, &fonts);
        assert!(count_changed(&pixmap) > 50);
    }

    #[test]
    fn draw_text_is_skipped_without_a_face() {
        let mut pixmap = blank_pixmap(60, 60);
        let fonts = FontLibrary::approximate();
        let commands = vec![
            Command::SetFillColor(Color::WHITE),
            Command::SetFont {
                role: FontRole::Title,
                size: Px::from_i32(40),
            },
            Command::DrawText {
                x: Px::from_i32(5),
                y: Px::from_i32(5),
                text: "Hi".to_string(),
            },
        ];
        replay(&mut pixmap, &commands, &fonts);
        assert_eq!(count_changed(&pixmap), 0);
    }

    #[test]
    fn decode_background_resizes_to_canvas() {
        let canvas = CanvasSpec::default();
        let src = RgbaImage::from_pixel(400, 700, image::Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        src.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        let pixmap = decode_background(&bytes, &canvas).unwrap();
        assert_eq!(pixmap.width(), 768);
        assert_eq!(pixmap.height(), 1344);
    }

    #[test]
    fn garbage_background_is_rejected() {
        let canvas = CanvasSpec::default();
        assert!(matches!(
            decode_background(&[0u8; 32], &canvas),
            Err(PlacardError::Asset(_))
        ));
    }

    #[test]
    fn encode_png_flattens_to_opaque_rgb() {
        let pixmap = blank_pixmap(8, 8);
        let bytes = encode_png(&pixmap).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
        let rgb = decoded.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }
}
