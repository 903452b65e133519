use crate::error::PlacardError;

pub const MAX_SECTIONS: usize = 3;
pub const MAX_BULLETS: usize = 3;

/// One titled group of bullet points.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: Option<String>,
    pub bullets: Vec<String>,
}

impl Section {
    /// Builds a section, truncating bullets past the caller-facing cap.
    pub fn new(heading: Option<String>, mut bullets: Vec<String>) -> Self {
        bullets.truncate(MAX_BULLETS);
        Self { heading, bullets }
    }
}

/// One unit of content laid out with its own card background.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Header {
        title: String,
        subtitle: Option<String>,
    },
    Section(Section),
    Takeaway {
        text: String,
    },
}

impl ContentBlock {
    pub fn is_header(&self) -> bool {
        matches!(self, ContentBlock::Header { .. })
    }
}

/// The full document to render: header first, sections in order, takeaway
/// last if present.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<Section>,
    pub takeaway: Option<String>,
}

impl Content {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            sections: Vec::new(),
            takeaway: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        if self.sections.len() < MAX_SECTIONS {
            self.sections.push(section);
        }
        self
    }

    pub fn takeaway(mut self, takeaway: impl Into<String>) -> Self {
        self.takeaway = Some(takeaway.into());
        self
    }

    /// The engine never synthesizes a default title; an empty one is a
    /// caller error.
    pub fn validate(&self) -> Result<(), PlacardError> {
        if self.title.trim().is_empty() {
            return Err(PlacardError::MalformedContent(
                "header title must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Flattens into the ordered block sequence the layout pipeline consumes.
    pub(crate) fn to_blocks(&self) -> Vec<ContentBlock> {
        let mut blocks = Vec::with_capacity(2 + self.sections.len());
        blocks.push(ContentBlock::Header {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
        });
        for section in self.sections.iter().take(MAX_SECTIONS) {
            blocks.push(ContentBlock::Section(Section::new(
                section.heading.clone(),
                section.bullets.clone(),
            )));
        }
        if let Some(takeaway) = &self.takeaway {
            blocks.push(ContentBlock::Takeaway {
                text: takeaway.clone(),
            });
        }
        blocks
    }
}

/// Footer branding. Empty segments are omitted entirely when drawing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Branding {
    pub handle: String,
    pub website: String,
}

impl Branding {
    pub fn new(handle: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            website: website.into(),
        }
    }

    pub fn has_handle(&self) -> bool {
        !self.handle.trim().is_empty()
    }

    pub fn has_website(&self) -> bool {
        !self.website.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_handle() && !self.has_website()
    }
}

/// Named arrangement templates. Unrecognized tags fall back to the default
/// multi-section stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    MultiSection,
    Checklist,
    Quote,
    Comparison,
}

impl Template {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "checklist" => Template::Checklist,
            "quote" => Template::Quote,
            "comparison" => Template::Comparison,
            _ => Template::MultiSection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_template_tag_falls_back_to_multi_section() {
        assert_eq!(Template::from_tag("comparison"), Template::Comparison);
        assert_eq!(Template::from_tag("CHECKLIST"), Template::Checklist);
        assert_eq!(Template::from_tag("mosaic"), Template::MultiSection);
        assert_eq!(Template::from_tag(""), Template::MultiSection);
    }

    #[test]
    fn empty_title_is_rejected() {
        let content = Content::new("  ");
        assert!(content.validate().is_err());
        assert!(Content::new("Key Insight").validate().is_ok());
    }

    #[test]
    fn section_and_bullet_caps_are_enforced() {
        let bullets: Vec<String> = (0..5).map(|i| format!("bullet {i}")).collect();
        let section = Section::new(Some("Heading".to_string()), bullets);
        assert_eq!(section.bullets.len(), MAX_BULLETS);

        let mut content = Content::new("Title");
        for _ in 0..5 {
            content = content.section(Section::new(None, vec!["b".to_string()]));
        }
        assert_eq!(content.sections.len(), MAX_SECTIONS);
    }

    #[test]
    fn blocks_preserve_document_order() {
        let content = Content::new("Title")
            .subtitle("Sub")
            .section(Section::new(Some("A".to_string()), vec!["a1".to_string()]))
            .section(Section::new(Some("B".to_string()), vec!["b1".to_string()]))
            .takeaway("Remember this");
        let blocks = content.to_blocks();
        assert_eq!(blocks.len(), 4);
        assert!(blocks[0].is_header());
        assert!(matches!(blocks[3], ContentBlock::Takeaway { .. }));
    }
}
