//! Events returned by the wizard session

use serde::{Deserialize, Serialize};

use crate::pages::Pages;
use crate::validate::IssuesReport;

/// What changed as the result of one session call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WizardEvent {
    /// The contract snapshot was replaced; observers re-read it
    ContractChanged,

    /// Page validity or usability differs from the previous pass
    StatusChanged {
        /// The new page status
        pages: Pages,
    },

    /// The issue report differs from the previous pass
    IssuesChanged {
        /// The new report
        issues: IssuesReport,
    },

    /// A page was selected (re-selecting the current page included)
    PageSelected {
        /// Page selected before, 0 if none
        previous: usize,
        /// Page selected now
        page: usize,
    },

    /// A requested page does not exist or is not usable yet
    PageRejected {
        /// The page that was asked for
        requested: usize,
    },

    /// A backup file replaced the session contract
    BackupLoaded {
        /// Locking address from the backup
        address: String,
    },
}

impl WizardEvent {
    /// Get the selected page if this is a selection event
    pub fn selected_page(&self) -> Option<usize> {
        match self {
            WizardEvent::PageSelected { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Check if this event reports a refused action
    pub fn is_rejection(&self) -> bool {
        matches!(self, WizardEvent::PageRejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_page() {
        let event = WizardEvent::PageSelected {
            previous: 2,
            page: 3,
        };
        assert_eq!(event.selected_page(), Some(3));
        assert_eq!(WizardEvent::ContractChanged.selected_page(), None);
    }

    #[test]
    fn test_is_rejection() {
        assert!(WizardEvent::PageRejected { requested: 4 }.is_rejection());
        assert!(!WizardEvent::ContractChanged.is_rejection());
    }

    #[test]
    fn test_event_serialization() {
        let event = WizardEvent::StatusChanged {
            pages: Pages::initial(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("StatusChanged"));
        assert!(json.contains("Input backup"));

        let parsed: WizardEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
