use crate::error::PlacardError;
use crate::types::Px;
use rustybuzz::{Face as HbFace, UnicodeBuffer};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// Semantic text roles. Titles and section headings render in the bold face,
/// everything else in the regular face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Title,
    Subtitle,
    Heading,
    Body,
    Footer,
}

impl FontRole {
    fn wants_bold(self) -> bool {
        matches!(self, FontRole::Title | FontRole::Heading)
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct WidthKey {
    face_index: usize,
    size_milli: i64,
    text: String,
}

#[derive(Debug)]
struct WidthCache {
    map: HashMap<WidthKey, Px>,
    order: VecDeque<WidthKey>,
    max_entries: usize,
}

impl WidthCache {
    fn new(max_entries: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
        }
    }

    fn get(&self, key: &WidthKey) -> Option<Px> {
        self.map.get(key).copied()
    }

    fn insert(&mut self, key: WidthKey, value: Px) {
        if self.map.contains_key(&key) {
            return;
        }
        self.map.insert(key.clone(), value);
        self.order.push_back(key);
        while self.map.len() > self.max_entries {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
            } else {
                break;
            }
        }
    }
}

#[derive(Debug)]
struct LoadedFace {
    name: String,
    data: Vec<u8>,
    // Advances for U+0020..=U+00FF in 1/1000 em, the measurement fast path.
    widths: Vec<u16>,
    missing_width: u16,
    ascent: i16,
    bold: bool,
}

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;

impl LoadedFace {
    fn from_bytes(data: Vec<u8>, source: &str) -> Result<Self, PlacardError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|_| PlacardError::Asset(format!("invalid font data for {source}")))?;
        let units_per_em = face.units_per_em().max(1);
        let scale = 1000.0 / units_per_em as f32;

        let mut widths = Vec::with_capacity((LAST_CHAR - FIRST_CHAR + 1) as usize);
        for code in FIRST_CHAR..=LAST_CHAR {
            let advance = char::from_u32(code as u32)
                .and_then(|ch| face.glyph_index(ch))
                .and_then(|gid| face.glyph_hor_advance(gid))
                .unwrap_or(0);
            let scaled = (advance as f32 * scale).round() as i32;
            widths.push(scaled.clamp(0, u16::MAX as i32) as u16);
        }
        let missing_width = widths
            .get((b' ' - FIRST_CHAR) as usize)
            .copied()
            .unwrap_or(0);

        let name = face
            .names()
            .into_iter()
            .find(|entry| entry.name_id == ttf_parser::name::name_id::FULL_NAME)
            .and_then(|entry| entry.to_string())
            .unwrap_or_else(|| source.to_string());
        let bold = face.is_bold() || face.weight().to_number() >= 600;
        // Everything borrowing `face` (and through it `data`) is computed
        // before `data` moves into the struct.
        let ascent = scale_to_mille(face.ascender(), scale);

        Ok(Self {
            name,
            data,
            widths,
            missing_width,
            ascent,
            bold,
        })
    }

    fn is_within_table(&self, text: &str) -> bool {
        text.chars().all(|ch| {
            let code = ch as u32;
            code >= FIRST_CHAR as u32 && code <= LAST_CHAR as u32
        })
    }

    fn measure_from_table(&self, size: Px, text: &str) -> Px {
        let mut total_units: i32 = 0;
        for ch in text.chars() {
            let code = ch as u32;
            let advance = if code < FIRST_CHAR as u32 || code > LAST_CHAR as u32 {
                self.missing_width
            } else {
                let idx = (code - FIRST_CHAR as u32) as usize;
                self.widths.get(idx).copied().unwrap_or(self.missing_width)
            };
            total_units = total_units.saturating_add(advance as i32);
        }
        if total_units <= 0 {
            return Px::ZERO;
        }
        size.mul_ratio(total_units, 1000)
    }

    fn measure_shaped(&self, size: Px, text: &str) -> Option<Px> {
        let face = HbFace::from_slice(&self.data, 0)?;
        let units_per_em = face.units_per_em().max(1) as i64;
        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        let output = rustybuzz::shape(&face, &[], buffer);
        let positions = output.glyph_positions();
        if positions.is_empty() {
            return None;
        }
        let mut total_units: i32 = 0;
        for pos in positions {
            let adv =
                (((pos.x_advance as i64) * 1000 + (units_per_em / 2)) / units_per_em) as i32;
            total_units = total_units.saturating_add(adv);
        }
        if total_units <= 0 {
            return Some(Px::ZERO);
        }
        Some(size.mul_ratio(total_units, 1000))
    }
}

fn scale_to_mille(value: i16, scale: f32) -> i16 {
    let scaled = (value as f32 * scale).round() as i32;
    scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Loaded once per process and shared read-only across renders. Render calls
/// never attempt a late font substitution; construction fails instead.
#[derive(Debug)]
pub struct FontLibrary {
    faces: Vec<LoadedFace>,
    regular: Option<usize>,
    bold: Option<usize>,
    width_cache: Mutex<WidthCache>,
}

impl FontLibrary {
    fn empty() -> Self {
        Self {
            faces: Vec::new(),
            regular: None,
            bold: None,
            width_cache: Mutex::new(WidthCache::new(20_000)),
        }
    }

    /// Registers every `.ttf`/`.otf` in `path` and fails if none is usable.
    pub fn load_dir(path: impl AsRef<Path>) -> Result<Self, PlacardError> {
        let mut library = Self::empty();
        let path = path.as_ref();
        let entries = fs::read_dir(path).map_err(|err| {
            PlacardError::MissingFontAsset(format!(
                "cannot read font directory {}: {err}",
                path.display()
            ))
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                library.register_file(&path);
            }
        }
        library.finish()
    }

    /// Builds a library from in-memory font programs.
    pub fn from_bytes(fonts: Vec<Vec<u8>>) -> Result<Self, PlacardError> {
        let mut library = Self::empty();
        for (index, data) in fonts.into_iter().enumerate() {
            let source = format!("font #{index}");
            match LoadedFace::from_bytes(data, &source) {
                Ok(face) => library.push_face(face),
                Err(err) => log::warn!("skipping {source}: {err}"),
            }
        }
        library.finish()
    }

    fn register_file(&mut self, path: &Path) {
        let Some(ext) = path.extension().and_then(|v| v.to_str()) else {
            return;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" {
            return;
        }
        let Ok(data) = fs::read(path) else {
            log::warn!("cannot read font file {}", path.display());
            return;
        };
        let source = path.display().to_string();
        match LoadedFace::from_bytes(data, &source) {
            Ok(face) => {
                log::debug!("registered font '{}' from {}", face.name, source);
                self.push_face(face);
            }
            Err(err) => log::warn!("skipping {source}: {err}"),
        }
    }

    fn push_face(&mut self, face: LoadedFace) {
        let index = self.faces.len();
        if face.bold {
            self.bold.get_or_insert(index);
        } else {
            self.regular.get_or_insert(index);
        }
        self.faces.push(face);
    }

    fn finish(mut self) -> Result<Self, PlacardError> {
        if self.faces.is_empty() {
            return Err(PlacardError::MissingFontAsset(
                "no usable TrueType/OpenType font registered".to_string(),
            ));
        }
        // A single weight covers both roles rather than failing the load.
        if self.regular.is_none() {
            self.regular = self.bold;
        }
        if self.bold.is_none() {
            self.bold = self.regular;
        }
        Ok(self)
    }

    /// Metrics-only library: no faces, widths approximated as 0.6em per char.
    /// Keeps layout deterministic and testable without font files on disk.
    #[cfg(test)]
    pub(crate) fn approximate() -> Self {
        Self::empty()
    }

    fn face_for(&self, role: FontRole) -> Option<(usize, &LoadedFace)> {
        let index = if role.wants_bold() {
            self.bold.or(self.regular)
        } else {
            self.regular.or(self.bold)
        }?;
        self.faces.get(index).map(|face| (index, face))
    }

    pub(crate) fn face_data(&self, role: FontRole) -> Option<&[u8]> {
        self.face_for(role).map(|(_, face)| face.data.as_slice())
    }

    /// Ascent above the baseline for a given size, in pixels.
    pub(crate) fn ascent(&self, role: FontRole, size: Px) -> Px {
        match self.face_for(role) {
            Some((_, face)) => size.mul_ratio(face.ascent as i32, 1000),
            None => size.mul_ratio(4, 5),
        }
    }

    /// Deterministic pixel width of `text` at `size`. Basic-latin text goes
    /// through the advance table; anything else is shaped with rustybuzz.
    pub fn measure(&self, role: FontRole, size: Px, text: &str) -> Px {
        let Some((face_index, face)) = self.face_for(role) else {
            // Approximate-metrics path: 0.6em per char, floored at 1px.
            let char_width = size.mul_ratio(3, 5).max(Px::from_i32(1));
            return char_width * (text.chars().count() as i32);
        };
        let key = WidthKey {
            face_index,
            size_milli: size.to_milli(),
            text: text.to_string(),
        };
        if let Ok(cache) = self.width_cache.lock() {
            if let Some(value) = cache.get(&key) {
                return value;
            }
        }
        let value = if face.is_within_table(text) {
            face.measure_from_table(size, text)
        } else {
            face.measure_shaped(size, text)
                .unwrap_or_else(|| face.measure_from_table(size, text))
        };
        if let Ok(mut cache) = self.width_cache.lock() {
            cache.insert(key, value);
        }
        value
    }
}
