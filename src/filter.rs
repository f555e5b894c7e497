use scraper::node::Element;
use scraper::ElementRef;

/// Decides whether an image is never a lightbox candidate: no usable source,
/// a vector-graphic source, a non-lazy inline placeholder, or an image that
/// lives inside an embedded frame's document context.
pub fn is_excluded(img: &ElementRef<'_>) -> bool {
    let element = img.value();
    let src = element.attr("src").unwrap_or("");
    let lazy = has_lazy_source(element);

    if src.is_empty() && !lazy {
        return true;
    }

    let lower = src.to_ascii_lowercase();
    if !src.is_empty() && (lower.ends_with(".svg") || lower.contains(".svg?")) {
        return true;
    }

    if src.starts_with("data:") && !lazy {
        return true;
    }

    inside_embedded_frame(img)
}

fn has_lazy_source(element: &Element) -> bool {
    ["data-src", "data-srcset"]
        .iter()
        .any(|attr| element.attr(attr).is_some_and(|value| !value.is_empty()))
}

fn inside_embedded_frame(img: &ElementRef<'_>) -> bool {
    img.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| matches!(ancestor.value().name(), "iframe" | "frame"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::node::Node;
    use scraper::{Html, Selector};

    fn excluded(markup: &str) -> bool {
        let fragment = Html::parse_fragment(markup);
        let selector = Selector::parse("img").expect("img selector");
        let img = fragment.select(&selector).next().expect("img element");
        is_excluded(&img)
    }

    #[test]
    fn image_without_any_source_is_excluded() {
        assert!(excluded(r#"<img alt="no source">"#));
        assert!(excluded(r#"<img src="">"#));
    }

    #[test]
    fn lazy_marker_rescues_an_image_without_live_src() {
        assert!(!excluded(r#"<img data-src="photo.jpg">"#));
        assert!(!excluded(r#"<img data-srcset="photo.jpg 800w">"#));
        assert!(excluded(r#"<img data-src="">"#));
    }

    #[test]
    fn vector_graphics_are_excluded_even_when_lazy() {
        assert!(excluded(r#"<img src="logo.svg">"#));
        assert!(excluded(r#"<img src="Logo.SVG">"#));
        assert!(excluded(r#"<img src="logo.svg?ver=2">"#));
        assert!(excluded(r#"<img src="logo.svg" data-src="real.jpg">"#));
        assert!(!excluded(r#"<img src="logo.svg.jpg">"#));
    }

    #[test]
    fn inline_placeholder_is_excluded_unless_lazy() {
        assert!(excluded(r#"<img src="data:image/gif;base64,R0lGOD">"#));
        assert!(!excluded(
            r#"<img src="data:image/gif;base64,R0lGOD" data-src="photo.jpg">"#
        ));
    }

    #[test]
    fn image_nested_inside_an_embedded_frame_is_excluded() {
        // The parser never nests elements under an iframe, so mirror a
        // script-built page by reparenting an img node into one.
        let mut doc = Html::parse_document(r#"<body><iframe></iframe></body>"#);
        let iframe_selector = Selector::parse("iframe").expect("iframe selector");
        let iframe_id = doc
            .select(&iframe_selector)
            .next()
            .expect("iframe element")
            .id();

        let donor = Html::parse_fragment(r#"<img src="photo.jpg">"#);
        let img_selector = Selector::parse("img").expect("img selector");
        let img_value = donor
            .select(&img_selector)
            .next()
            .expect("img element")
            .value()
            .clone();

        let img_id = doc
            .tree
            .get_mut(iframe_id)
            .expect("iframe node")
            .append(Node::Element(img_value))
            .id();

        let img = ElementRef::wrap(doc.tree.get(img_id).expect("img node")).expect("element");
        assert!(is_excluded(&img));
    }
}
