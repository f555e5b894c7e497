use regex::Regex;
use scraper::node::Element;
use std::sync::OnceLock;

static SIZE_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();

fn size_suffix_re() -> &'static Regex {
    SIZE_SUFFIX_RE.get_or_init(|| Regex::new(r"-\d+x\d+(\.[a-zA-Z]+)$").expect("size suffix regex"))
}

/// Infers the best-available full-size URL for an image element from its
/// markup attributes alone. Returns `None` when the image has no usable
/// target (empty or inline-encoded source).
///
/// Priority: largest entry of the responsive source set (lazy-load variant
/// first), then the lazy-load plain source, then the live source. A trailing
/// `-<w>x<h>` thumbnail suffix immediately before the file extension is
/// stripped from the winner.
pub fn resolve_full_size(img: &Element) -> Option<String> {
    let srcset = non_empty_attr(img, "data-srcset").or_else(|| non_empty_attr(img, "srcset"));
    let from_srcset = srcset.and_then(largest_srcset_url);

    let candidate = match from_srcset {
        Some(url) => url,
        None => non_empty_attr(img, "data-src")
            .or_else(|| non_empty_attr(img, "src"))?
            .to_string(),
    };

    if candidate.starts_with("data:") {
        return None;
    }

    Some(size_suffix_re().replace(&candidate, "$1").into_owned())
}

fn non_empty_attr<'a>(img: &'a Element, name: &str) -> Option<&'a str> {
    img.attr(name).filter(|value| !value.is_empty())
}

/// Picks the URL of the widest entry in a `"<url> <width>w, ..."` source set.
///
/// Each entry is split at its last space so URLs that themselves contain
/// spaces survive; the width descriptor drops a trailing `w` and defaults to
/// 0 when unparseable. The sort is stable, so ties keep the first entry.
fn largest_srcset_url(srcset: &str) -> Option<String> {
    let mut entries: Vec<(&str, u32)> = Vec::new();
    for item in srcset.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        match item.rsplit_once(' ') {
            Some((url, descriptor)) => entries.push((url, parse_width(descriptor))),
            None => entries.push((item, 0)),
        }
    }
    if entries.is_empty() {
        return None;
    }

    entries.sort_by(|a, b| b.1.cmp(&a.1));
    let url = entries[0].0;
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

fn parse_width(descriptor: &str) -> u32 {
    descriptor
        .strip_suffix('w')
        .unwrap_or(descriptor)
        .parse()
        .unwrap_or(0)
}
