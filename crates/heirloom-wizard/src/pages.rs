//! Page status and the navigation gate.

use serde::{Deserialize, Serialize};

use crate::events::WizardEvent;

pub const PAGE_COUNT: usize = 4;

pub const PAGE_TITLES: [&str; PAGE_COUNT] = ["Input backup", "From where", "To where", "Transaction"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStatus {
    pub title: String,
    /// All inputs on the page pass validation.
    pub valid: bool,
    /// The page may be entered.
    pub usable: bool,
}

/// Status of the four wizard pages, 1-indexed through [`Pages::page`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pages([PageStatus; PAGE_COUNT]);

impl Pages {
    /// Status before any validation has run: only the first page is usable.
    pub fn initial() -> Self {
        Self::build(|i| (true, i == 0))
    }

    /// Page 4 is always valid; each page after the first is usable only if
    /// the one before it is valid.
    pub fn from_validity(page1: bool, page2: bool, page3: bool) -> Self {
        let valid = [page1, page2, page3, true];
        Self::build(|i| (valid[i], i == 0 || valid[i - 1]))
    }

    fn build(status: impl Fn(usize) -> (bool, bool)) -> Self {
        Self(std::array::from_fn(|i| {
            let (valid, usable) = status(i);
            PageStatus {
                title: PAGE_TITLES[i].to_string(),
                valid,
                usable,
            }
        }))
    }

    pub fn page(&self, number: usize) -> Option<&PageStatus> {
        number.checked_sub(1).and_then(|i| self.0.get(i))
    }

    pub fn is_usable(&self, number: usize) -> bool {
        self.page(number).is_some_and(|p| p.usable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageStatus> {
        self.0.iter()
    }
}

impl Default for Pages {
    fn default() -> Self {
        Self::initial()
    }
}

/// Tracks the selected page. `0` means no page is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNavigator {
    selected: usize,
}

impl PageNavigator {
    pub fn new() -> Self {
        Self { selected: 1 }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Select page `requested` if it exists and is usable.
    ///
    /// Re-selecting the current page still yields an event.
    pub fn change_page(&mut self, pages: &Pages, requested: usize) -> Option<WizardEvent> {
        if !pages.is_usable(requested) {
            log::debug!("page {} is not usable", requested);
            return None;
        }
        let previous = self.selected;
        self.selected = requested;
        log::info!("page {} -> {}", previous, requested);
        Some(WizardEvent::PageSelected {
            previous,
            page: requested,
        })
    }
}

impl Default for PageNavigator {
    fn default() -> Self {
        Self::new()
    }
}
