use crate::config::{
    Settings, WidgetBehavior, STANDARD_GALLERY_BLOCK_CLASS, STANDARD_IMAGE_BLOCK_CLASS,
};
use crate::document::PageDocument;
use crate::filter;
use crate::resolve;
use crate::widget::{LightboxHandle, LightboxWidget, WidgetOptions};
use ego_tree::NodeId;
use regex::Regex;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Marker class the widget collaborator activates on.
pub const ACTIVATION_CLASS: &str = "glightbox";
/// Group class shared by every anchor under the global grouping policy.
pub const GLOBAL_GROUP_CLASS: &str = "lw-global";

const GROUP_CLASS_PREFIX: &str = "lw-group";

// Wrap anchors are minted from this template so attribute construction never
// needs the parser internals; unused attributes are dropped per image.
const ANCHOR_TEMPLATE: &str =
    r#"<a href="" class="" data-description="" aria-label="" data-type=""></a>"#;

const ARIA_LABEL_FALLBACK: &str = "View larger image";

static IMAGE_EXTENSION_RE: OnceLock<Regex> = OnceLock::new();

fn image_extension_re() -> &'static Regex {
    IMAGE_EXTENSION_RE.get_or_init(|| {
        Regex::new(r"\.(jpeg|jpg|gif|png|webp|bmp|svg)$").expect("image extension regex")
    })
}

/// Walks the configured containers, wires eligible images into lightbox
/// anchors, and drives the widget collaborator per group.
///
/// The scanner is the sole owner of the processed-container set and the
/// global lightbox handle; both live for the page's lifetime and are only
/// ever appended to, so re-entrant passes triggered by rapid mutation
/// notifications stay safe without any locking.
pub struct Scanner {
    selectors: Vec<Selector>,
    group_page_images: bool,
    behavior: WidgetBehavior,
    widget: Box<dyn LightboxWidget>,
    processed: HashSet<NodeId>,
    global_lightbox: Option<Box<dyn LightboxHandle>>,
    started: bool,
    anchor_template: Element,
}

enum ImagePlan {
    /// The image has no wrapping hyperlink yet; mint one around it.
    Wrap {
        img: NodeId,
        href: String,
        description: String,
        aria_label: String,
    },
    /// Adopt the hyperlink already wrapping the image.
    Adopt {
        anchor: NodeId,
        add_classes: Vec<String>,
        /// Set together with the `data-type="image"` hint when the existing
        /// target had to be overwritten.
        href: Option<String>,
        description: Option<String>,
        aria_label: Option<String>,
    },
}

impl Scanner {
    pub fn new(settings: &Settings, widget: Box<dyn LightboxWidget>) -> Self {
        let selectors = settings
            .selector_list()
            .into_iter()
            .filter_map(|raw| match Selector::parse(&raw) {
                Ok(selector) => Some(selector),
                Err(_) => {
                    tracing::debug!(selector = %raw, "dropping unparsable container selector");
                    None
                }
            })
            .collect();

        Self {
            selectors,
            group_page_images: settings.group_page_images,
            behavior: settings.behavior,
            widget,
            processed: HashSet::new(),
            global_lightbox: None,
            started: false,
            anchor_template: anchor_template(),
        }
    }

    /// Runs the initial pass and arms the scanner for mutation-driven
    /// re-scans.
    pub fn start(&mut self, doc: &mut PageDocument) {
        self.started = true;
        self.scan(doc);
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// One full pass over every configured selector. Idempotent per
    /// container: a container is processed at most once for the page's
    /// lifetime, and a container with no images yet is left unprocessed so a
    /// later pass can pick it up once content arrives.
    pub fn scan(&mut self, doc: &mut PageDocument) {
        let mut processed_this_pass = 0usize;

        for selector_index in 0..self.selectors.len() {
            let container_ids: Vec<NodeId> = doc
                .dom()
                .select(&self.selectors[selector_index])
                .map(|el| el.id())
                .collect();

            for (container_index, container_id) in container_ids.into_iter().enumerate() {
                if self.processed.contains(&container_id) {
                    continue;
                }

                let group_class = if self.group_page_images {
                    GLOBAL_GROUP_CLASS.to_string()
                } else {
                    format!("{GROUP_CLASS_PREFIX}-{selector_index}-{container_index}")
                };

                let Some(plans) = self.plan_container(doc, container_id, &group_class) else {
                    continue;
                };

                for plan in plans {
                    self.apply_plan(doc.dom_mut(), plan, &group_class);
                }

                self.processed.insert(container_id);
                processed_this_pass += 1;

                if !self.group_page_images {
                    let options =
                        WidgetOptions::for_group(&format!(".{group_class}"), &self.behavior);
                    self.widget.create(options);
                }
            }
        }

        if self.group_page_images && processed_this_pass > 0 {
            match self.global_lightbox.as_mut() {
                Some(handle) => handle.reload(),
                None => {
                    let options = WidgetOptions::for_group(
                        &format!(".{GLOBAL_GROUP_CLASS}"),
                        &self.behavior,
                    );
                    self.global_lightbox = Some(self.widget.create(options));
                }
            }
        }

        tracing::debug!(
            containers = processed_this_pass,
            total = self.processed.len(),
            global = self.group_page_images,
            "lightbox scan pass finished"
        );
    }

    /// Read-only half of container processing. `None` means the container is
    /// skipped this pass without being marked processed: it is a standard
    /// image block owned by an enclosing gallery block, or it has no images
    /// yet. `Some` may be empty when every image was ineligible; the
    /// container still counts as processed then.
    fn plan_container(
        &self,
        doc: &PageDocument,
        container_id: NodeId,
        group_class: &str,
    ) -> Option<Vec<ImagePlan>> {
        let node = doc.dom().tree.get(container_id)?;
        let container = ElementRef::wrap(node)?;

        if is_image_block_inside_gallery(&container) {
            return None;
        }

        let img_selector = Selector::parse("img").expect("img selector");
        let images: Vec<ElementRef<'_>> = container.select(&img_selector).collect();
        if images.is_empty() {
            return None;
        }

        let mut plans = Vec::new();
        for img in images {
            if filter::is_excluded(&img) {
                continue;
            }
            let Some(href) = resolve::resolve_full_size(img.value()) else {
                continue;
            };
            plans.push(plan_image(&img, href, group_class));
        }
        Some(plans)
    }

    fn apply_plan(&self, html: &mut Html, plan: ImagePlan, group_class: &str) {
        match plan {
            ImagePlan::Wrap {
                img,
                href,
                description,
                aria_label,
            } => {
                let mut anchor = self.anchor_template.clone();
                let template = &self.anchor_template;
                set_attr(&mut anchor, template, "href", &href);
                set_attr(
                    &mut anchor,
                    template,
                    "class",
                    &format!("{ACTIVATION_CLASS} {group_class}"),
                );
                set_attr(&mut anchor, template, "data-description", &description);
                set_attr(&mut anchor, template, "aria-label", &aria_label);
                remove_attr(&mut anchor, "data-type");

                let Some(mut img_node) = html.tree.get_mut(img) else {
                    return;
                };
                let mut anchor_node = img_node.insert_before(Node::Element(anchor));
                anchor_node.append_id(img);
            }
            ImagePlan::Adopt {
                anchor,
                add_classes,
                href,
                description,
                aria_label,
            } => {
                let Some(mut anchor_node) = html.tree.get_mut(anchor) else {
                    return;
                };
                let Node::Element(element) = anchor_node.value() else {
                    return;
                };
                for class in &add_classes {
                    append_class(element, &self.anchor_template, class);
                }
                if let Some(href) = href {
                    set_attr(element, &self.anchor_template, "href", &href);
                    set_attr(element, &self.anchor_template, "data-type", "image");
                }
                if let Some(description) = description {
                    set_attr(element, &self.anchor_template, "data-description", &description);
                }
                if let Some(aria_label) = aria_label {
                    set_attr(element, &self.anchor_template, "aria-label", &aria_label);
                }
            }
        }
    }
}

/// Decides wrap vs adopt for one eligible image and captures every read the
/// mutation step needs.
fn plan_image(img: &ElementRef<'_>, href: String, group_class: &str) -> ImagePlan {
    let parent_anchor = img
        .parent()
        .and_then(ElementRef::wrap)
        .filter(|el| el.value().name() == "a");
    let alt = img.value().attr("alt").unwrap_or("");

    let Some(anchor) = parent_anchor else {
        return ImagePlan::Wrap {
            img: img.id(),
            href,
            description: alt.to_string(),
            aria_label: aria_label_for(alt),
        };
    };

    let anchor_element = anchor.value();
    let existing_href = anchor_element.attr("href").unwrap_or("");
    let img_src = img.value().attr("src").unwrap_or("");

    // An existing target survives only when it already points at an image
    // file and is neither empty nor self-referential. Matching the anchor's
    // href against the image's own source is intentional: it catches the
    // self-linking anchors other tooling generates around images.
    let clean_href = existing_href
        .split('?')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    let is_image_link = image_extension_re().is_match(&clean_href);
    let overwrite = !is_image_link || existing_href.contains(img_src) || existing_href.is_empty();

    let description = {
        let existing = anchor_element.attr("data-description").unwrap_or("");
        if existing.is_empty() && !alt.is_empty() {
            Some(alt.to_string())
        } else {
            None
        }
    };
    let aria_label = if anchor_element.attr("aria-label").is_none() {
        Some(aria_label_for(alt))
    } else {
        None
    };

    let existing_classes: Vec<&str> = anchor_element
        .attr("class")
        .unwrap_or("")
        .split_whitespace()
        .collect();
    let add_classes = [ACTIVATION_CLASS, group_class]
        .into_iter()
        .filter(|class| !existing_classes.contains(class))
        .map(str::to_string)
        .collect();

    ImagePlan::Adopt {
        anchor: anchor.id(),
        add_classes,
        href: overwrite.then_some(href),
        description,
        aria_label,
    }
}

fn aria_label_for(alt: &str) -> String {
    if alt.is_empty() {
        ARIA_LABEL_FALLBACK.to_string()
    } else {
        format!("{ARIA_LABEL_FALLBACK}: {alt}")
    }
}

/// A standard image block that sits inside a standard gallery block belongs
/// to the gallery's pass, never its own. Checked against the literal block
/// classes regardless of which selector matched the container.
fn is_image_block_inside_gallery(container: &ElementRef<'_>) -> bool {
    if !has_class(container.value(), STANDARD_IMAGE_BLOCK_CLASS) {
        return false;
    }
    has_class(container.value(), STANDARD_GALLERY_BLOCK_CLASS)
        || container
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| has_class(ancestor.value(), STANDARD_GALLERY_BLOCK_CLASS))
}

fn has_class(element: &Element, class: &str) -> bool {
    element
        .attr("class")
        .is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

fn anchor_template() -> Element {
    let fragment = Html::parse_fragment(ANCHOR_TEMPLATE);
    let selector = Selector::parse("a").expect("anchor selector");
    let anchor = fragment
        .select(&selector)
        .next()
        .expect("anchor template element");
    anchor.value().clone()
}

fn attr_index(element: &Element, name: &str) -> Option<usize> {
    element
        .attrs
        .iter()
        .position(|(attr_name, _)| attr_name.local.as_ref() == name)
}

fn set_attr(element: &mut Element, template: &Element, name: &str, value: &str) {
    if let Some(index) = attr_index(element, name) {
        element.attrs[index].1.clear();
        element.attrs[index].1.push_slice(value);
    } else if let Some(template_index) = attr_index(template, name) {
        let mut attr = template.attrs[template_index].clone();
        attr.1.clear();
        attr.1.push_slice(value);
        // attrs stay sorted by name; Element::attr binary-searches them.
        let insert_at = element
            .attrs
            .binary_search_by(|existing| existing.0.cmp(&attr.0))
            .unwrap_or_else(|position| position);
        element.attrs.insert(insert_at, attr);
    }
}

fn remove_attr(element: &mut Element, name: &str) {
    if let Some(index) = attr_index(element, name) {
        element.attrs.remove(index);
    }
}

fn append_class(element: &mut Element, template: &Element, class: &str) {
    let Some(index) = attr_index(element, "class") else {
        set_attr(element, template, "class", class);
        return;
    };
    let current = element.attrs[index].1.to_string();
    if current.split_whitespace().any(|c| c == class) {
        return;
    }
    let joined = if current.trim().is_empty() {
        class.to_string()
    } else {
        format!("{} {class}", current.trim_end())
    };
    element.attrs[index].1.clear();
    element.attrs[index].1.push_slice(&joined);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aria_label_falls_back_when_alt_is_empty() {
        assert_eq!(aria_label_for(""), "View larger image");
        assert_eq!(aria_label_for("A cat"), "View larger image: A cat");
    }

    #[test]
    fn anchor_template_carries_every_attribute_the_scanner_sets() {
        let template = anchor_template();
        for name in ["href", "class", "data-description", "aria-label", "data-type"] {
            assert!(attr_index(&template, name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn set_attr_updates_in_place_and_mints_from_the_template() {
        let template = anchor_template();
        let mut element = template.clone();
        remove_attr(&mut element, "data-type");
        assert!(attr_index(&element, "data-type").is_none());

        set_attr(&mut element, &template, "href", "photo.jpg");
        set_attr(&mut element, &template, "href", "other.jpg");
        set_attr(&mut element, &template, "data-type", "image");
        assert_eq!(element.attr("href"), Some("other.jpg"));
        assert_eq!(element.attr("data-type"), Some("image"));

        let names: Vec<&str> = element
            .attrs
            .iter()
            .map(|(name, _)| name.local.as_ref())
            .collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted, "minted attribute broke the sort order");
    }

    #[test]
    fn append_class_deduplicates() {
        let template = anchor_template();
        let mut element = template.clone();
        append_class(&mut element, &template, "glightbox");
        append_class(&mut element, &template, "lw-group-0-0");
        append_class(&mut element, &template, "glightbox");
        assert_eq!(element.attr("class"), Some("glightbox lw-group-0-0"));
    }

    #[test]
    fn gallery_nesting_check_matches_the_literal_block_classes() {
        let doc = Html::parse_document(
            r#"<body>
              <figure class="wp-block-gallery">
                <figure class="wp-block-image inner"><img src="a.jpg"></figure>
              </figure>
              <figure class="wp-block-image outer"><img src="b.jpg"></figure>
            </body>"#,
        );
        let inner = Selector::parse(".inner").expect("selector");
        let outer = Selector::parse(".outer").expect("selector");
        let inner_el = doc.select(&inner).next().expect("inner");
        let outer_el = doc.select(&outer).next().expect("outer");
        assert!(is_image_block_inside_gallery(&inner_el));
        assert!(!is_image_block_inside_gallery(&outer_el));
    }
}
