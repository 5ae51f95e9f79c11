//! Navigation and menu store.
//!
//! Transient, process-lifetime state: desktop menu, mobile menu, and which
//! navigation section is active.
//!
//! # Mobile Menu State Machine
//!
//! ```text
//!            open
//!   closed ───────▶ open
//!     ▲               │
//!     └───────────────┘
//!   close | escape | outside click | route change | desktop menu closed
//! ```
//!
//! Opening an open menu and closing a closed one are no-ops. Body scrolling
//! is locked exactly while the mobile menu is open, whichever transition
//! got it there.

use crate::events::{AppEvent, Broadcast, EventBus, SubscriptionId};
use crate::ui::{Document, NavItem};
use std::sync::Arc;

/// Observable state of the navigation store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub menu_open: bool,
    pub mobile_menu_open: bool,
    pub active_section: Option<String>,
    pub items: Vec<NavItem>,
}

/// Why the mobile menu closed. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Explicit,
    Escape,
    OutsideClick,
    RouteChange,
    DesktopMenuClosed,
}

pub struct NavigationStore {
    state: NavigationState,
    observers: EventBus<NavigationState>,
    broadcast: Arc<Broadcast>,
    document: Arc<dyn Document>,
}

impl NavigationStore {
    pub fn new(items: Vec<NavItem>, broadcast: Arc<Broadcast>, document: Arc<dyn Document>) -> Self {
        document.set_scroll_locked(false);
        Self {
            state: NavigationState {
                items,
                ..NavigationState::default()
            },
            observers: EventBus::new(),
            broadcast,
            document,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &NavigationState {
        &self.state
    }

    #[must_use]
    pub const fn is_mobile_menu_open(&self) -> bool {
        self.state.mobile_menu_open
    }

    #[must_use]
    pub fn items(&self) -> &[NavItem] {
        &self.state.items
    }

    /// Opens or closes the desktop menu. Closing it also closes the mobile
    /// menu.
    pub fn set_menu_open(&mut self, open: bool) {
        let _span = tracing::debug_span!("set_menu_open", open).entered();

        let mut changed = self.state.menu_open != open;
        self.state.menu_open = open;
        if !open {
            changed |= self.transition_mobile(false, CloseReason::DesktopMenuClosed);
        }
        if changed {
            self.notify();
        }
    }

    pub fn set_mobile_menu_open(&mut self, open: bool) {
        let _span = tracing::debug_span!("set_mobile_menu_open", open).entered();
        if self.transition_mobile(open, CloseReason::Explicit) {
            self.notify();
        }
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.set_mobile_menu_open(!self.state.mobile_menu_open);
    }

    /// Escape-key shortcut: closes the mobile menu if it is open.
    pub fn handle_escape(&mut self) {
        if self.transition_mobile(false, CloseReason::Escape) {
            self.notify();
        }
    }

    /// Click outside the menu panel: closes the mobile menu if it is open.
    pub fn handle_outside_click(&mut self) {
        if self.transition_mobile(false, CloseReason::OutsideClick) {
            self.notify();
        }
    }

    /// Closes every menu. Safe to call when nothing is open.
    pub fn close_all_menus(&mut self) {
        let mut changed = std::mem::replace(&mut self.state.menu_open, false);
        changed |= self.transition_mobile(false, CloseReason::Explicit);
        if changed {
            self.notify();
        }
    }

    /// Marks `section` (an item id or href) active across the whole tree.
    ///
    /// Every item is recomputed: an item is active when it matches `section`
    /// or one of its descendants does.
    pub fn set_active_section(&mut self, section: impl Into<String>) {
        let section = section.into();
        let _span = tracing::debug_span!("set_active_section", section = %section).entered();

        let matched = mark_active(&mut self.state.items, &section);
        if !matched {
            tracing::debug!("section matches no navigation item");
        }
        self.state.active_section = Some(section.clone());

        self.notify();
        self.broadcast.publish(&AppEvent::ActiveSectionChanged {
            section: Some(section),
        });
    }

    /// Route change: derives the active section from `path` and closes all
    /// menus.
    pub fn route_changed(&mut self, path: &str) {
        let _span = tracing::debug_span!("route_changed", path = %path).entered();

        self.state.menu_open = false;
        self.transition_mobile(false, CloseReason::RouteChange);

        match section_for_path(&self.state.items, path) {
            Some(id) => self.set_active_section(id),
            None => {
                clear_active(&mut self.state.items);
                self.state.active_section = None;
                self.notify();
                self.broadcast
                    .publish(&AppEvent::ActiveSectionChanged { section: None });
            }
        }
    }

    /// Moves the mobile menu to `open`, keeping the scroll lock in step.
    /// Returns whether anything changed.
    fn transition_mobile(&mut self, open: bool, reason: CloseReason) -> bool {
        if self.state.mobile_menu_open == open {
            return false;
        }
        self.state.mobile_menu_open = open;
        self.document.set_scroll_locked(open);

        if open {
            tracing::debug!("mobile menu opened");
        } else {
            tracing::debug!(reason = ?reason, "mobile menu closed");
        }
        self.broadcast.publish(&AppEvent::MobileMenuChanged { open });
        true
    }

    fn notify(&self) {
        self.observers.publish(&self.state);
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NavigationState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for NavigationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationStore")
            .field("menu_open", &self.state.menu_open)
            .field("mobile_menu_open", &self.state.mobile_menu_open)
            .field("active_section", &self.state.active_section)
            .finish_non_exhaustive()
    }
}

/// Recomputes `is_active` for every item. Returns whether any item matched.
fn mark_active(items: &mut [NavItem], section: &str) -> bool {
    let mut any = false;
    for item in items {
        let child_active = mark_active(&mut item.children, section);
        item.is_active = item.matches(section) || child_active;
        any |= item.is_active;
    }
    any
}

fn clear_active(items: &mut [NavItem]) {
    for item in items {
        item.is_active = false;
        clear_active(&mut item.children);
    }
}

/// Finds the id of the item whose href is the longest prefix of `path`.
/// The root href `/` only matches the root path exactly.
fn section_for_path(items: &[NavItem], path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };

    items
        .iter()
        .flat_map(NavItem::walk)
        .filter(|item| {
            if item.href == "/" {
                path == "/"
            } else {
                path == item.href || path.starts_with(&format!("{}/", item.href))
            }
        })
        .max_by_key(|item| item.href.len())
        .map(|item| item.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{site_navigation, DocumentState};

    fn store() -> (NavigationStore, Arc<DocumentState>) {
        let document = Arc::new(DocumentState::new());
        let store = NavigationStore::new(site_navigation(), Arc::new(Broadcast::new()), document.clone());
        (store, document)
    }

    fn active_ids(store: &NavigationStore) -> Vec<String> {
        store
            .items()
            .iter()
            .flat_map(NavItem::walk)
            .filter(|i| i.is_active)
            .map(|i| i.id.clone())
            .collect()
    }

    #[test]
    fn scroll_lock_tracks_mobile_menu_through_every_close_path() {
        let (mut nav, document) = store();

        let steps: Vec<(&str, fn(&mut NavigationStore))> = vec![
            ("open", |n: &mut NavigationStore| n.set_mobile_menu_open(true)),
            ("open again", |n: &mut NavigationStore| n.set_mobile_menu_open(true)),
            ("escape", NavigationStore::handle_escape),
            ("toggle", NavigationStore::toggle_mobile_menu),
            ("outside click", NavigationStore::handle_outside_click),
            ("escape when closed", NavigationStore::handle_escape),
            ("toggle", NavigationStore::toggle_mobile_menu),
            ("route change", |n: &mut NavigationStore| n.route_changed("/sermons")),
            ("toggle", NavigationStore::toggle_mobile_menu),
            ("desktop closed", |n: &mut NavigationStore| n.set_menu_open(false)),
            ("toggle", NavigationStore::toggle_mobile_menu),
            ("toggle", NavigationStore::toggle_mobile_menu),
            ("close all", NavigationStore::close_all_menus),
        ];

        for (name, step) in steps {
            step(&mut nav);
            assert_eq!(
                document.flags().scroll_locked,
                nav.is_mobile_menu_open(),
                "mismatch after {name}"
            );
        }
        assert!(!nav.is_mobile_menu_open());
    }

    #[test]
    fn closing_desktop_menu_closes_mobile_menu() {
        let (mut nav, _) = store();
        nav.set_menu_open(true);
        nav.set_mobile_menu_open(true);
        nav.set_menu_open(false);
        assert!(!nav.state().mobile_menu_open);
    }

    #[test]
    fn close_all_menus_is_idempotent() {
        let (mut nav, _) = store();
        let notifications = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let n = Arc::clone(&notifications);
        nav.subscribe(move |_| {
            n.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        nav.close_all_menus();
        nav.close_all_menus();
        assert_eq!(notifications.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn active_section_recomputes_whole_tree() {
        let (mut nav, _) = store();
        nav.set_active_section("women");
        assert_eq!(active_ids(&nav), vec!["ministries", "women"]);

        nav.set_active_section("/sermons");
        assert_eq!(active_ids(&nav), vec!["sermons"]);
    }

    #[test]
    fn route_change_derives_section_and_closes_menus() {
        let (mut nav, _) = store();
        nav.set_menu_open(true);
        nav.route_changed("/contact/prayer?ref=home");
        assert_eq!(nav.state().active_section.as_deref(), Some("prayer"));
        assert_eq!(active_ids(&nav), vec!["contact", "prayer"]);
        assert!(!nav.state().menu_open);

        nav.route_changed("/");
        assert_eq!(active_ids(&nav), vec!["home"]);

        nav.route_changed("/unknown");
        assert!(active_ids(&nav).is_empty());
        assert_eq!(nav.state().active_section, None);
    }
}
