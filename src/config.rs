use crate::Result;
use serde::Deserialize;

/// Class carried by the standard image block container.
pub const STANDARD_IMAGE_BLOCK_CLASS: &str = "wp-block-image";
/// Class carried by the standard gallery block container.
pub const STANDARD_GALLERY_BLOCK_CLASS: &str = "wp-block-gallery";

const STANDARD_IMAGE_BLOCK_SELECTOR: &str = ".wp-block-image";
const STANDARD_GALLERY_BLOCK_SELECTOR: &str = ".wp-block-gallery";

/// Page-load settings, delivered as page-embedded JSON by the asset layer.
///
/// Missing fields take their defaults, so a partial settings object is always
/// completed; unknown fields are ignored. Immutable after construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Master switch. When false, bootstrap wires nothing.
    pub enabled: bool,
    /// Target standard image block containers automatically.
    pub image_blocks: bool,
    /// Target standard gallery block containers automatically.
    pub gallery_blocks: bool,
    /// Raw custom container selectors, comma or newline separated.
    pub custom_selectors: String,
    /// Merge every container on the page into one global lightbox group.
    pub group_page_images: bool,
    #[serde(flatten)]
    pub behavior: WidgetBehavior,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            image_blocks: true,
            gallery_blocks: true,
            custom_selectors: String::new(),
            group_page_images: false,
            behavior: WidgetBehavior::default(),
        }
    }
}

/// Behavior flags passed through verbatim to the widget collaborator.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetBehavior {
    pub touch_navigation: bool,
    #[serde(rename = "loop")]
    pub loop_navigation: bool,
    pub autoplay_videos: bool,
    pub close_button: bool,
    pub close_on_outside_click: bool,
    pub preload: bool,
}

impl Default for WidgetBehavior {
    fn default() -> Self {
        Self {
            touch_navigation: true,
            loop_navigation: true,
            autoplay_videos: true,
            close_button: true,
            close_on_outside_click: true,
            preload: true,
        }
    }
}

impl Settings {
    pub fn from_embedded_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Ordered, deduplicated container selector list: the standard block
    /// selectors gated by their toggles, then the custom ones.
    pub fn selector_list(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        if self.image_blocks {
            out.push(STANDARD_IMAGE_BLOCK_SELECTOR.to_string());
        }
        if self.gallery_blocks {
            out.push(STANDARD_GALLERY_BLOCK_SELECTOR.to_string());
        }
        for part in self
            .custom_selectors
            .split(|ch| matches!(ch, '\n' | '\r' | ','))
        {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !out.iter().any(|existing| existing == trimmed) {
                out.push(trimmed.to_string());
            }
        }
        out
    }
}
