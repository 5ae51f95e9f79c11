//! Navigation item tree.
//!
//! The site navigation is a small tree: top-level sections, some with nested
//! sub-items. Labels are translation keys so the tree itself is language
//! independent.

use serde::{Deserialize, Serialize};

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    /// Translation key for the label (`nav.sermons`).
    pub label_key: String,
    pub href: String,
    #[serde(default)]
    pub children: Vec<NavItem>,
    /// Recomputed by the navigation store; never authored.
    #[serde(skip)]
    pub is_active: bool,
}

impl NavItem {
    pub fn new(id: impl Into<String>, label_key: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label_key: label_key.into(),
            href: href.into(),
            children: Vec::new(),
            is_active: false,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<NavItem>) -> Self {
        self.children = children;
        self
    }

    /// Whether `section` names this item by id or by href.
    #[must_use]
    pub fn matches(&self, section: &str) -> bool {
        self.id == section || self.href == section
    }

    /// Depth-first iterator over this item and all descendants.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &NavItem> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(NavItem::walk)))
    }
}

/// The default site navigation.
#[must_use]
pub fn site_navigation() -> Vec<NavItem> {
    vec![
        NavItem::new("home", "nav.home", "/"),
        NavItem::new("about", "nav.about", "/about"),
        NavItem::new("ministries", "nav.ministries", "/ministries").with_children(vec![
            NavItem::new("youth", "ministries.youth", "/ministries/youth"),
            NavItem::new("women", "ministries.women", "/ministries/women"),
            NavItem::new("music", "ministries.music", "/ministries/music"),
            NavItem::new("children", "ministries.children", "/ministries/children"),
        ]),
        NavItem::new("sermons", "nav.sermons", "/sermons"),
        NavItem::new("events", "nav.events", "/events"),
        NavItem::new("gallery", "nav.gallery", "/gallery"),
        NavItem::new("contact", "nav.contact", "/contact").with_children(vec![NavItem::new(
            "prayer",
            "nav.prayer",
            "/contact/prayer",
        )]),
    ]
}
