use ego_tree::{NodeMut, NodeRef};
use scraper::node::Node;
use scraper::{Html, Selector};

/// Whether the page's structural content is available yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Complete,
}

/// An owned, mutable HTML page the scanner works against.
///
/// The host parses the page once, hands this to `bootstrap`, and simulates
/// its dynamic-content pipeline by appending fragments and firing the page
/// events. Node identities are stable for the life of the document: nodes
/// are inserted and reparented but never destroyed, which is what lets the
/// scanner keep an identity-keyed processed set across passes.
pub struct PageDocument {
    html: Html,
    ready_state: ReadyState,
    pub(crate) lightbox_bootstrapped: bool,
}

impl PageDocument {
    /// Parses a page whose content is fully available.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
            ready_state: ReadyState::Complete,
            lightbox_bootstrapped: false,
        }
    }

    /// Parses a page that is still streaming in; initialization against it
    /// is deferred until the ready notification fires.
    pub fn parse_loading(markup: &str) -> Self {
        Self {
            ready_state: ReadyState::Loading,
            ..Self::parse(markup)
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready_state = ReadyState::Complete;
    }

    pub fn dom(&self) -> &Html {
        &self.html
    }

    pub(crate) fn dom_mut(&mut self) -> &mut Html {
        &mut self.html
    }

    /// Serializes the current page back to markup.
    pub fn to_html(&self) -> String {
        self.html.root_element().html()
    }

    /// Appends a parsed fragment to the first element matching `selector`,
    /// the host-side stand-in for AJAX-injected or infinite-scroll content.
    /// Returns false when the selector is invalid or matches nothing.
    pub fn append_html(&mut self, selector: &str, markup: &str) -> bool {
        let Ok(selector) = Selector::parse(selector) else {
            return false;
        };
        let Some(target_id) = self.html.select(&selector).next().map(|el| el.id()) else {
            return false;
        };

        let fragment = Html::parse_fragment(markup);
        let Some(mut target) = self.html.tree.get_mut(target_id) else {
            return false;
        };
        for child in fragment.root_element().children() {
            append_subtree(&mut target, child);
        }
        true
    }
}

fn append_subtree(dest: &mut NodeMut<'_, Node>, src: NodeRef<'_, Node>) {
    let mut copied = dest.append(src.value().clone());
    for child in src.children() {
        append_subtree(&mut copied, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_marks_the_document_complete() {
        let doc = PageDocument::parse("<body><p>hi</p></body>");
        assert_eq!(doc.ready_state(), ReadyState::Complete);
        assert!(doc.to_html().contains("<p>hi</p>"));
    }

    #[test]
    fn parse_loading_defers_readiness() {
        let doc = PageDocument::parse_loading("<body></body>");
        assert_eq!(doc.ready_state(), ReadyState::Loading);
    }

    #[test]
    fn append_html_adds_a_fragment_subtree_to_the_target() {
        let mut doc = PageDocument::parse(r#"<body><div class="feed"></div></body>"#);
        let appended = doc.append_html(
            ".feed",
            r#"<figure class="wp-block-image"><img src="a.jpg" alt="A"></figure>"#,
        );
        assert!(appended);
        let html = doc.to_html();
        assert!(html.contains(r#"<figure class="wp-block-image">"#), "html={html}");
        assert!(html.contains(r#"<img alt="A" src="a.jpg">"#), "html={html}");
    }

    #[test]
    fn append_html_rejects_bad_or_unmatched_selectors() {
        let mut doc = PageDocument::parse("<body></body>");
        assert!(!doc.append_html("p..", "<span></span>"));
        assert!(!doc.append_html(".missing", "<span></span>"));
    }
}
