use crate::font::FontRole;
use crate::types::{Color, Px, Rect};

/// Drawing commands recorded by templates and replayed by the rasterizer.
/// Coordinates are pixels with the origin at the canvas top-left, y down.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Px),
    SetFont {
        role: FontRole,
        size: Px,
    },
    FillRoundRect {
        rect: Rect,
        radius: Px,
    },
    StrokeRoundRect {
        rect: Rect,
        radius: Px,
    },
    FillCircle {
        cx: Px,
        cy: Px,
        radius: Px,
    },
    StrokeCircle {
        cx: Px,
        cy: Px,
        radius: Px,
    },
    StrokeEllipse {
        cx: Px,
        cy: Px,
        rx: Px,
        ry: Px,
    },
    StrokeLine {
        x1: Px,
        y1: Px,
        x2: Px,
        y2: Px,
    },
    /// Draws one line of text with its line box's top-left corner at (x, y).
    DrawText {
        x: Px,
        y: Px,
        text: String,
    },
}

#[derive(Debug, Clone)]
struct DrawState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Px,
    font_role: FontRole,
    font_size: Px,
}

/// Records the text overlay for one render call. Redundant state changes are
/// elided so replay stays cheap.
pub struct Overlay {
    commands: Vec<Command>,
    state: DrawState,
}

impl Overlay {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            state: DrawState {
                fill_color: Color::BLACK,
                stroke_color: Color::BLACK,
                line_width: Px::from_i32(1),
                font_role: FontRole::Body,
                font_size: Px::from_i32(12),
            },
        }
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color == color {
            return;
        }
        self.state.fill_color = color;
        self.commands.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.state.stroke_color == color {
            return;
        }
        self.state.stroke_color = color;
        self.commands.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Px) {
        let width = width.max(Px::ZERO);
        if self.state.line_width == width {
            return;
        }
        self.state.line_width = width;
        self.commands.push(Command::SetLineWidth(width));
    }

    pub fn set_font(&mut self, role: FontRole, size: Px) {
        if self.state.font_role == role && self.state.font_size == size {
            return;
        }
        self.state.font_role = role;
        self.state.font_size = size;
        self.commands.push(Command::SetFont { role, size });
    }

    pub fn fill_round_rect(&mut self, rect: Rect, radius: Px) {
        self.commands.push(Command::FillRoundRect { rect, radius });
    }

    pub fn stroke_round_rect(&mut self, rect: Rect, radius: Px) {
        self.commands.push(Command::StrokeRoundRect { rect, radius });
    }

    pub fn fill_circle(&mut self, cx: Px, cy: Px, radius: Px) {
        self.commands.push(Command::FillCircle { cx, cy, radius });
    }

    pub fn stroke_circle(&mut self, cx: Px, cy: Px, radius: Px) {
        self.commands.push(Command::StrokeCircle { cx, cy, radius });
    }

    pub fn stroke_ellipse(&mut self, cx: Px, cy: Px, rx: Px, ry: Px) {
        self.commands.push(Command::StrokeEllipse { cx, cy, rx, ry });
    }

    pub fn stroke_line(&mut self, x1: Px, y1: Px, x2: Px, y2: Px) {
        self.commands.push(Command::StrokeLine { x1, y1, x2, y2 });
    }

    pub fn draw_text(&mut self, x: Px, y: Px, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.commands.push(Command::DrawText { x, y, text });
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn finish(self) -> Vec<Command> {
        self.commands
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}
