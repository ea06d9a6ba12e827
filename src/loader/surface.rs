//! Mount points the loader renders into.

use crate::config::{FeedConfig, RenderConfig};
use crate::render::styles::{self, STYLE_ELEMENT_ID};
use crate::render::Element;

pub const STATUS_ELEMENT_ID: &str = "yt-loader";
pub const SENTINEL_ELEMENT_ID: &str = "feed-sentinel";

/// Host-side view of the feed: a container, a status line and a sentinel.
pub trait FeedSurface {
    fn append(&mut self, item_id: &str, card: Element);
    fn prepend(&mut self, item_id: &str, card: Element);
    /// Removes a rendered item; false if no such item is shown.
    fn remove(&mut self, item_id: &str) -> bool;
    fn show_skeletons(&mut self, skeletons: Vec<Element>);
    fn remove_skeletons(&mut self);
    fn show_notice(&mut self, notice: Element);
    fn set_status(&mut self, text: &str);
    /// Puts the sentinel back after the status line and returns its id.
    fn attach_sentinel(&mut self) -> Sentinel;
    fn detach_sentinel(&mut self);
    /// True when no feed items are rendered.
    fn is_empty(&self) -> bool;
    fn clear(&mut self);
}

/// Invisible marker placed after the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    id: String,
}

impl Sentinel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Item,
    Skeleton,
    Notice,
}

#[derive(Debug, Clone)]
struct Entry {
    kind: EntryKind,
    key: Option<String>,
    element: Element,
}

/// In-memory page that serializes to HTML.
#[derive(Debug, Clone)]
pub struct HtmlSurface {
    container_id: String,
    created_container: bool,
    inject_styles: bool,
    root_margin: String,
    entries: Vec<Entry>,
    status: String,
    sentinel: Option<Sentinel>,
}

impl HtmlSurface {
    /// Picks the first configured container id the host page already has,
    /// creating `feed` when none match.
    pub fn mount(host_ids: &[&str], feed: &FeedConfig, render: &RenderConfig) -> Self {
        let existing = feed
            .container_ids
            .iter()
            .find(|id| host_ids.contains(&id.as_str()));

        let (container_id, created_container) = match existing {
            Some(id) => (id.clone(), false),
            None => {
                tracing::debug!("No feed container on the host page, creating #feed");
                ("feed".to_string(), true)
            }
        };

        Self {
            container_id,
            created_container,
            inject_styles: render.inject_styles && !host_ids.contains(&STYLE_ELEMENT_ID),
            root_margin: render.sentinel_root_margin.clone(),
            entries: Vec::new(),
            status: String::new(),
            sentinel: None,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn created_container(&self) -> bool {
        self.created_container
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn sentinel(&self) -> Option<&Sentinel> {
        self.sentinel.as_ref()
    }

    pub fn rendered_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Item)
            .filter_map(|e| e.key.as_deref())
            .collect()
    }

    pub fn rendered_cards(&self) -> Vec<&Element> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Item)
            .map(|e| &e.element)
            .collect()
    }

    pub fn skeleton_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Skeleton)
            .count()
    }

    pub fn notice(&self) -> Option<&Element> {
        self.entries
            .iter()
            .find(|e| e.kind == EntryKind::Notice)
            .map(|e| &e.element)
    }

    /// The container, status line and sentinel, in document order.
    pub fn to_fragment(&self) -> String {
        let container = Element::new("main")
            .attr("id", self.container_id.as_str())
            .children(self.entries.iter().map(|e| e.element.clone()));

        let mut out = container.to_html();
        Element::new("div")
            .attr("id", STATUS_ELEMENT_ID)
            .attr("aria-live", "polite")
            .text(self.status.as_str())
            .write_html(&mut out);
        if let Some(sentinel) = &self.sentinel {
            Element::new("div")
                .attr("id", sentinel.id())
                .attr("aria-hidden", "true")
                .attr("style", "height:1px")
                .attr("data-root-margin", self.root_margin.as_str())
                .write_html(&mut out);
        }
        out
    }

    /// A standalone page around [`to_fragment`](Self::to_fragment).
    pub fn to_document(&self, title: &str) -> String {
        let mut head = Element::new("head")
            .child(Element::new("meta").attr("charset", "utf-8"))
            .child(
                Element::new("meta")
                    .attr("name", "viewport")
                    .attr("content", "width=device-width, initial-scale=1"),
            )
            .child(Element::new("title").text(title));
        if self.inject_styles {
            head = head.child(styles::style_element(&self.container_id));
        }

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">{}<body>{}</body></html>\n",
            head.to_html(),
            self.to_fragment()
        )
    }

    fn position_of(&self, item_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.kind == EntryKind::Item && e.key.as_deref() == Some(item_id))
    }
}

impl FeedSurface for HtmlSurface {
    fn append(&mut self, item_id: &str, card: Element) {
        self.entries.push(Entry {
            kind: EntryKind::Item,
            key: Some(item_id.to_string()),
            element: card,
        });
    }

    fn prepend(&mut self, item_id: &str, card: Element) {
        self.entries.insert(
            0,
            Entry {
                kind: EntryKind::Item,
                key: Some(item_id.to_string()),
                element: card,
            },
        );
    }

    fn remove(&mut self, item_id: &str) -> bool {
        match self.position_of(item_id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn show_skeletons(&mut self, skeletons: Vec<Element>) {
        self.entries.extend(skeletons.into_iter().map(|element| Entry {
            kind: EntryKind::Skeleton,
            key: None,
            element,
        }));
    }

    fn remove_skeletons(&mut self) {
        self.entries.retain(|e| e.kind != EntryKind::Skeleton);
    }

    fn show_notice(&mut self, notice: Element) {
        self.entries.push(Entry {
            kind: EntryKind::Notice,
            key: None,
            element: notice,
        });
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn attach_sentinel(&mut self) -> Sentinel {
        let sentinel = Sentinel::new(SENTINEL_ELEMENT_ID);
        self.sentinel = Some(sentinel.clone());
        sentinel
    }

    fn detach_sentinel(&mut self) {
        self.sentinel = None;
    }

    fn is_empty(&self) -> bool {
        !self.entries.iter().any(|e| e.kind == EntryKind::Item)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.status.clear();
    }
}
