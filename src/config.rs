use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// The style table shipped with the crate, documented key by key.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Options {
    pub headings: HeadingStyles,
    pub bullets: Bullets,
    pub quote: QuoteOptions,
}

/// Formatting tags of the target dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    Bold,
    Italics,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Span,
}

impl StyleTag {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            StyleTag::Bold => b"*",
            StyleTag::Italics => b"_",
            StyleTag::Underline => b"__",
            StyleTag::Strikethrough => b"~",
            StyleTag::Spoiler => b"||",
            StyleTag::Code => b"```",
            StyleTag::Span => b"`",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingStyle {
    pub tag: StyleTag,
    pub prefix: String,
    pub postfix: String,
}

impl HeadingStyle {
    pub fn new(tag: StyleTag) -> Self {
        Self {
            tag,
            prefix: String::new(),
            postfix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.postfix = postfix.into();
        self
    }
}

impl Default for HeadingStyle {
    fn default() -> Self {
        Self::new(StyleTag::Bold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingStyles {
    pub h1: HeadingStyle,
    pub h2: HeadingStyle,
    pub h3: HeadingStyle,
    pub h4: HeadingStyle,
    pub h5: HeadingStyle,
    pub h6: HeadingStyle,
}

impl Default for HeadingStyles {
    fn default() -> Self {
        Self {
            h1: HeadingStyle::new(StyleTag::Bold),
            h2: HeadingStyle::new(StyleTag::Bold),
            h3: HeadingStyle::new(StyleTag::Bold),
            h4: HeadingStyle::new(StyleTag::Italics),
            h5: HeadingStyle::new(StyleTag::Italics),
            h6: HeadingStyle::new(StyleTag::Italics),
        }
    }
}

impl HeadingStyles {
    /// Style for a heading level. Levels outside 1..=6 clamp to the nearest one.
    pub fn for_level(&self, level: u8) -> &HeadingStyle {
        match level {
            0 | 1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            _ => &self.h6,
        }
    }

    fn for_level_mut(&mut self, level: u8) -> &mut HeadingStyle {
        match level {
            0 | 1 => &mut self.h1,
            2 => &mut self.h2,
            3 => &mut self.h3,
            4 => &mut self.h4,
            5 => &mut self.h5,
            _ => &mut self.h6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bullets {
    pub primary: char,
    pub secondary: char,
    pub additional: char,
}

impl Default for Bullets {
    fn default() -> Self {
        Self {
            primary: '•',
            secondary: '‣',
            additional: '⁃',
        }
    }
}

impl Bullets {
    /// Glyph for a list nesting depth (0 = top-level list). Depths past the
    /// last glyph reuse it.
    pub fn glyph(&self, depth: usize) -> char {
        let glyphs = [self.primary, self.secondary, self.additional];
        glyphs[depth.min(glyphs.len() - 1)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuoteOptions {
    /// Re-wrap the rendered document as a block quote.
    pub enable: bool,
    /// Always mark the whole quote as expandable.
    pub expandable: bool,
    /// Mark the lines after this many as expandable. 0 disables.
    pub expand_after_lines: usize,
}

impl Options {
    pub fn with_heading(mut self, level: u8, style: HeadingStyle) -> Self {
        *self.headings.for_level_mut(level) = style;
        self
    }

    pub fn with_primary_bullet(mut self, glyph: char) -> Self {
        self.bullets.primary = glyph;
        self
    }

    pub fn with_secondary_bullet(mut self, glyph: char) -> Self {
        self.bullets.secondary = glyph;
        self
    }

    pub fn with_additional_bullet(mut self, glyph: char) -> Self {
        self.bullets.additional = glyph;
        self
    }

    pub fn with_quote(mut self, quote: QuoteOptions) -> Self {
        self.quote = quote;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load options from a TOML file. Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
