//! Per-type block content.
//!
//! [`BlockContent`] is the closed set of payloads a page block can carry,
//! one variant struct per block type, tagged in JSON by a `"type"` key.
//! [`BlockType`] is the field-less tag used for display, parsing and
//! toolbar choices.
//!
//! Nothing in the history engine matches on these variants; it only clones
//! and replaces them wholesale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single image inside a gallery block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Typed content of a block, keyed by block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    /// Section heading, `level` 1 through 6.
    Heading { text: String, level: u8 },

    /// Plain paragraph of rich text (stored as HTML-ish markup).
    Paragraph { text: String },

    /// Single image with optional caption.
    Image {
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        caption: Option<String>,
    },

    /// Grid of images.
    Gallery {
        images: Vec<GalleryImage>,
        #[serde(default = "default_gallery_columns")]
        columns: u8,
    },

    /// Call-to-action button.
    Button {
        label: String,
        href: String,
        #[serde(default)]
        variant: Option<String>,
    },

    /// Table with a header row.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },

    /// Embedded or hosted video.
    Video {
        src: String,
        #[serde(default)]
        autoplay: bool,
        #[serde(default)]
        caption: Option<String>,
    },

    /// Bulleted or numbered list.
    List { items: Vec<String>, ordered: bool },

    /// Block quotation.
    Quote {
        text: String,
        #[serde(default)]
        cite: Option<String>,
    },

    /// Code listing.
    Code {
        source: String,
        #[serde(default)]
        language: Option<String>,
    },

    /// Horizontal rule.
    Divider,

    /// Vertical whitespace in pixels.
    Spacer { height: u32 },
}

fn default_gallery_columns() -> u8 {
    3
}

impl BlockContent {
    /// Returns the type tag of this content.
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Heading { .. } => BlockType::Heading,
            BlockContent::Paragraph { .. } => BlockType::Paragraph,
            BlockContent::Image { .. } => BlockType::Image,
            BlockContent::Gallery { .. } => BlockType::Gallery,
            BlockContent::Button { .. } => BlockType::Button,
            BlockContent::Table { .. } => BlockType::Table,
            BlockContent::Video { .. } => BlockType::Video,
            BlockContent::List { .. } => BlockType::List,
            BlockContent::Quote { .. } => BlockType::Quote,
            BlockContent::Code { .. } => BlockType::Code,
            BlockContent::Divider => BlockType::Divider,
            BlockContent::Spacer { .. } => BlockType::Spacer,
        }
    }

    /// Default (empty) content for a freshly inserted block of `ty`.
    pub fn empty(ty: BlockType) -> Self {
        match ty {
            BlockType::Heading => BlockContent::Heading {
                text: String::new(),
                level: 2,
            },
            BlockType::Paragraph => BlockContent::Paragraph {
                text: String::new(),
            },
            BlockType::Image => BlockContent::Image {
                src: String::new(),
                alt: String::new(),
                caption: None,
            },
            BlockType::Gallery => BlockContent::Gallery {
                images: Vec::new(),
                columns: default_gallery_columns(),
            },
            BlockType::Button => BlockContent::Button {
                label: String::new(),
                href: String::new(),
                variant: None,
            },
            BlockType::Table => BlockContent::Table {
                headers: Vec::new(),
                rows: Vec::new(),
            },
            BlockType::Video => BlockContent::Video {
                src: String::new(),
                autoplay: false,
                caption: None,
            },
            BlockType::List => BlockContent::List {
                items: Vec::new(),
                ordered: false,
            },
            BlockType::Quote => BlockContent::Quote {
                text: String::new(),
                cite: None,
            },
            BlockType::Code => BlockContent::Code {
                source: String::new(),
                language: None,
            },
            BlockType::Divider => BlockContent::Divider,
            BlockType::Spacer => BlockContent::Spacer { height: 32 },
        }
    }
}

/// Field-less block type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Heading,
    Paragraph,
    Image,
    Gallery,
    Button,
    Table,
    Video,
    List,
    Quote,
    Code,
    Divider,
    Spacer,
}

impl BlockType {
    /// Every block type, in toolbar order.
    pub const ALL: [BlockType; 12] = [
        BlockType::Heading,
        BlockType::Paragraph,
        BlockType::Image,
        BlockType::Gallery,
        BlockType::Button,
        BlockType::Table,
        BlockType::Video,
        BlockType::List,
        BlockType::Quote,
        BlockType::Code,
        BlockType::Divider,
        BlockType::Spacer,
    ];

    /// The JSON tag for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Heading => "heading",
            BlockType::Paragraph => "paragraph",
            BlockType::Image => "image",
            BlockType::Gallery => "gallery",
            BlockType::Button => "button",
            BlockType::Table => "table",
            BlockType::Video => "video",
            BlockType::List => "list",
            BlockType::Quote => "quote",
            BlockType::Code => "code",
            BlockType::Divider => "divider",
            BlockType::Spacer => "spacer",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| CoreError::UnknownBlockType { tag: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_tagged_by_type() {
        let content = BlockContent::Heading {
            text: "Title".into(),
            level: 1,
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["text"], "Title");
        assert_eq!(json["level"], 1);
    }

    #[test]
    fn test_unit_variant_roundtrip() {
        let json = serde_json::json!({ "type": "divider" });
        let content: BlockContent = serde_json::from_value(json).unwrap();
        assert_eq!(content, BlockContent::Divider);
    }

    #[test]
    fn test_optional_fields_default() {
        let json = serde_json::json!({ "type": "image", "src": "/a.png" });
        let content: BlockContent = serde_json::from_value(json).unwrap();
        assert_eq!(
            content,
            BlockContent::Image {
                src: "/a.png".into(),
                alt: String::new(),
                caption: None,
            }
        );
    }

    #[test]
    fn test_gallery_json_shape() {
        let json = serde_json::json!({
            "type": "gallery",
            "images": [{ "src": "/a.png", "alt": "A" }]
        });
        let content: BlockContent = serde_json::from_value(json).unwrap();
        insta::assert_json_snapshot!(content, @r#"
        {
          "type": "gallery",
          "images": [
            {
              "src": "/a.png",
              "alt": "A"
            }
          ],
          "columns": 3
        }
        "#);
    }

    #[test]
    fn test_empty_content_matches_type() {
        for ty in BlockType::ALL {
            assert_eq!(BlockContent::empty(ty).block_type(), ty);
        }
    }

    #[test]
    fn test_block_type_parse_and_display() {
        for ty in BlockType::ALL {
            assert_eq!(ty.to_string().parse::<BlockType>().unwrap(), ty);
        }
        assert_eq!(
            "carousel".parse::<BlockType>(),
            Err(CoreError::UnknownBlockType {
                tag: "carousel".into()
            })
        );
    }

    #[test]
    fn test_block_type_serde_matches_tag() {
        let json = serde_json::to_string(&BlockType::Gallery).unwrap();
        assert_eq!(json, "\"gallery\"");
    }
}
