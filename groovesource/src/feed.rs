//! Feeds, tabs and pages

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tab shown on top of a feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub title: String,
}

impl Tab {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One page of items plus the token to request the next one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Opaque continuation handed back by the host, `None` on the last page
    pub continuation: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, continuation: Option<String>) -> Self {
        Self {
            items,
            continuation,
        }
    }

    /// Single page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Feed returned to the host, optionally split into tabs
///
/// The default page is shown when no tab (or an unknown tab) is selected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feed<T> {
    pub tabs: Vec<Tab>,
    default: Page<T>,
    by_tab: BTreeMap<String, Page<T>>,
}

impl<T> Feed<T> {
    /// Untabbed feed made of one page
    pub fn single(items: Vec<T>) -> Self {
        Self {
            tabs: Vec::new(),
            default: Page::last(items),
            by_tab: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::single(Vec::new())
    }

    /// Tabbed feed; `pages` maps tab ids to their content
    pub fn tabbed(tabs: Vec<Tab>, default: Page<T>, pages: impl IntoIterator<Item = (String, Page<T>)>) -> Self {
        Self {
            tabs,
            default,
            by_tab: pages.into_iter().collect(),
        }
    }

    /// Page to display for the selected tab
    pub fn page(&self, tab: Option<&str>) -> &Page<T> {
        tab.and_then(|id| self.by_tab.get(id)).unwrap_or(&self.default)
    }

    pub fn is_empty(&self) -> bool {
        self.default.items.is_empty() && self.by_tab.values().all(|p| p.items.is_empty())
    }
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self::empty()
    }
}
