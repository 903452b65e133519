//! Adaptive text-overlay rendering engine.
//!
//! Takes a generated background image plus structured content (header,
//! sections of bullets, takeaway) and produces a finished social-media
//! infographic: text is measured with real font metrics, shrunk uniformly
//! until it fits above a reserved branding footer, laid out on rounded
//! cards, and rasterized onto the background.
//!
//! ```no_run
//! use placard::{Content, Placard, Section, Template};
//!
//! let engine = Placard::builder()
//!     .font_dir("assets/fonts")
//!     .handle("@maria")
//!     .website("maria.dev")
//!     .build()?;
//!
//! let content = Content::new("Five Habits That Compound")
//!     .section(Section::new(
//!         Some("Start".into()),
//!         vec!["write the test first".into()],
//!     ))
//!     .takeaway("Small steps, every day");
//!
//! let background = std::fs::read("background.png")?;
//! let result = engine.render(&background, &content, Template::MultiSection)?;
//! std::fs::write("post.png", &result.png)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod canvas;
pub mod content;
pub mod error;
pub mod font;
pub mod layout;
pub mod measure;
pub mod style;
pub mod templates;
pub mod types;

mod footer;
mod raster;

pub use content::{Branding, Content, ContentBlock, Section, Template};
pub use error::PlacardError;
pub use font::{FontLibrary, FontRole};
pub use layout::LayoutPlan;
pub use style::{CanvasSpec, Theme};
pub use types::{Color, Px, Rect};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use canvas::Overlay;
use std::path::PathBuf;
use std::sync::Arc;

/// The finished render plus what the layout engine decided along the way.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Final composited image, PNG-encoded, opaque RGB.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Uniform scale the solver settled on (1.0 when everything fit).
    pub font_scale: f32,
    /// Content blocks that made it onto the canvas.
    pub blocks_rendered: usize,
    /// Trailing blocks the overflow guard excluded.
    pub blocks_dropped: usize,
}

impl RenderResult {
    pub fn was_truncated(&self) -> bool {
        self.blocks_dropped > 0
    }
}

/// Configures and builds a [`Placard`] engine.
#[derive(Default)]
pub struct PlacardBuilder {
    font_dir: Option<PathBuf>,
    font_bytes: Vec<Vec<u8>>,
    canvas: Option<CanvasSpec>,
    theme: Option<Theme>,
    branding: Branding,
    footer: bool,
}

impl PlacardBuilder {
    pub fn new() -> Self {
        Self {
            footer: true,
            ..Self::default()
        }
    }

    /// Directory scanned for `.ttf`/`.otf` files at build time.
    pub fn font_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_dir = Some(path.into());
        self
    }

    /// Adds an in-memory font program. May be called repeatedly; the first
    /// regular and first bold face registered win their roles.
    pub fn font_bytes(mut self, data: Vec<u8>) -> Self {
        self.font_bytes.push(data);
        self
    }

    pub fn canvas(mut self, canvas: CanvasSpec) -> Self {
        self.canvas = Some(canvas);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn handle(mut self, handle: impl Into<String>) -> Self {
        self.branding.handle = handle.into();
        self
    }

    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.branding.website = website.into();
        self
    }

    pub fn branding(mut self, branding: Branding) -> Self {
        self.branding = branding;
        self
    }

    /// Disables the branding footer entirely when `false`.
    pub fn footer(mut self, footer: bool) -> Self {
        self.footer = footer;
        self
    }

    /// Validates the canvas and loads fonts. Font problems surface here,
    /// never as a lazy substitution during a render call.
    pub fn build(self) -> Result<Placard, PlacardError> {
        let canvas = self.canvas.unwrap_or_default();
        canvas.validate()?;

        let fonts = match self.font_dir {
            Some(dir) => FontLibrary::load_dir(dir)?,
            None => FontLibrary::from_bytes(self.font_bytes)?,
        };

        Ok(Placard {
            fonts: Arc::new(fonts),
            canvas,
            theme: self.theme.unwrap_or_default(),
            branding: self.branding,
            footer: self.footer,
        })
    }
}

/// The rendering engine. Build once, render many times; all per-call state
/// lives on the stack of [`Placard::render`].
pub struct Placard {
    fonts: Arc<FontLibrary>,
    canvas: CanvasSpec,
    theme: Theme,
    branding: Branding,
    footer: bool,
}

impl Placard {
    pub fn builder() -> PlacardBuilder {
        PlacardBuilder::new()
    }

    pub fn canvas(&self) -> &CanvasSpec {
        &self.canvas
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Renders `content` over the encoded background image (PNG or JPEG).
    /// Backgrounds at other dimensions are resized to the canvas first.
    pub fn render(
        &self,
        background: &[u8],
        content: &Content,
        template: Template,
    ) -> Result<RenderResult, PlacardError> {
        content.validate()?;
        let mut pixmap = raster::decode_background(background, &self.canvas)?;

        let mut overlay = Overlay::new();
        let stats = templates::draw(
            &mut overlay,
            &self.fonts,
            &self.theme,
            &self.canvas,
            content,
            template,
        );
        if self.footer {
            footer::draw_footer(
                &mut overlay,
                &self.fonts,
                &self.theme,
                &self.canvas,
                &self.branding,
            );
        }

        raster::replay(&mut pixmap, overlay.commands(), &self.fonts);
        let png = raster::encode_png(&pixmap)?;

        Ok(RenderResult {
            png,
            width: pixmap.width(),
            height: pixmap.height(),
            font_scale: stats.font_scale,
            blocks_rendered: stats.blocks_rendered,
            blocks_dropped: stats.blocks_dropped,
        })
    }

    /// Convenience wrapper for pipelines that move images as base64 strings:
    /// decodes the background, renders, and returns the PNG re-encoded as
    /// base64.
    pub fn render_base64(
        &self,
        background_base64: &str,
        content: &Content,
        template: Template,
    ) -> Result<String, PlacardError> {
        let background = BASE64
            .decode(background_base64.trim())
            .map_err(|err| PlacardError::Asset(format!("invalid base64 background: {err}")))?;
        let result = self.render(&background, content, template)?;
        Ok(BASE64.encode(result.png))
    }
}
