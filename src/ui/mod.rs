//! Presentation seams used by the stores.
//!
//! The stores never render anything. They do flip a few document-level flags
//! and own the navigation tree's active state; this module holds both.
//!
//! # Modules
//!
//! - [`document`]: [`Document`] trait for root-level side effects
//! - [`nav`]: Navigation item tree

pub mod document;
pub mod nav;

pub use document::{Document, DocumentFlags, DocumentState};
pub use nav::{site_navigation, NavItem};
