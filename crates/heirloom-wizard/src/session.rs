//! The owner wizard session.
//!
//! Holds the single contract snapshot and everything derived from it. Every
//! mutator takes `&mut self`, so there is exactly one writer; the derived
//! state is recomputed in full after each change.
//!
//! One change runs:
//!
//! ```text
//! apply user update (draft dropped)
//!   -> identity (network, address type)
//!   -> reconcile inputs
//!   -> reconcile amounts (estimated size)  -> build draft
//!   -> reconcile amounts (measured size)   -> build draft
//!   -> validate
//! ```

use chrono::{DateTime, Utc};
use heirloom_core::countdown::lock_countdown_from_millis;
use heirloom_core::{
    Classifier, ContractBackup, ContractSnapshot, ContractUpdate, LockCountdown,
    TransactionBuilder,
};

use crate::config::WizardConfig;
use crate::events::WizardEvent;
use crate::pages::{PageNavigator, Pages};
use crate::reconcile::{reconcile_amounts, reconcile_inputs};
use crate::validate::{identity_update, validate_with_min_fee, IssuesReport};

pub struct OwnerSession<P> {
    primitives: P,
    config: WizardConfig,
    contract: ContractSnapshot,
    issues: IssuesReport,
    pages: Pages,
    navigator: PageNavigator,
    backup: Option<ContractBackup>,
}

impl<P: Classifier + TransactionBuilder> OwnerSession<P> {
    pub fn new(primitives: P, config: WizardConfig) -> Self {
        let contract = config.default_snapshot();
        Self {
            primitives,
            config,
            contract,
            issues: IssuesReport::default(),
            pages: Pages::initial(),
            navigator: PageNavigator::new(),
            backup: None,
        }
    }

    pub fn contract(&self) -> &ContractSnapshot {
        &self.contract
    }

    pub fn issues(&self) -> &IssuesReport {
        &self.issues
    }

    pub fn pages(&self) -> &Pages {
        &self.pages
    }

    pub fn page_selected(&self) -> usize {
        self.navigator.selected()
    }

    pub fn backup(&self) -> Option<&ContractBackup> {
        self.backup.as_ref()
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Apply a user edit and recompute everything derived from it.
    pub fn change_contract_values(&mut self, update: ContractUpdate) -> Vec<WizardEvent> {
        let before = self.contract.clone();
        let mut next = self.contract.updated(&update);
        next.tx = None;
        self.run_cycle(before, next)
    }

    /// Select a page; refused unless the page is usable.
    pub fn change_page(&mut self, page: usize) -> Vec<WizardEvent> {
        match self.navigator.change_page(&self.pages, page) {
            Some(event) => vec![event],
            None => vec![WizardEvent::PageRejected { requested: page }],
        }
    }

    /// Replace the whole session contract with one seeded from `backup`.
    pub fn change_file(&mut self, backup: ContractBackup) -> Vec<WizardEvent> {
        log::info!("Loading backup for {}", backup.address);
        let before = self.contract.clone();
        let seeded = backup.clone().into_snapshot(&self.config.default_snapshot());
        let mut events = vec![WizardEvent::BackupLoaded {
            address: backup.address.clone(),
        }];
        self.backup = Some(backup);
        events.extend(self.run_cycle(before, seeded));
        events
    }

    /// Time left on (or since) the lock of the loaded backup.
    ///
    /// `None` without a backup, a creation time or a parseable duration.
    pub fn lock_countdown(&self, now: DateTime<Utc>) -> Option<LockCountdown> {
        let backup = self.backup.as_ref()?;
        let created_at = backup.created_at?;
        let days = self.contract.days_locked.trim().parse().ok()?;
        lock_countdown_from_millis(created_at, days, now)
    }

    fn run_cycle(
        &mut self,
        before: ContractSnapshot,
        mut next: ContractSnapshot,
    ) -> Vec<WizardEvent> {
        next = next.updated(&identity_update(&next, &self.primitives));
        next = next.updated(&reconcile_inputs(&next));

        // estimated size first, then the size of the draft it produced
        for _ in 0..2 {
            next = next.updated(&reconcile_amounts(&next));
            next.tx = self.primitives.build_transaction(&next);
        }

        let validation =
            validate_with_min_fee(&next, &self.primitives, self.config.min_fee_rate());
        next = next.updated(&validation.update);

        let mut events = Vec::new();
        if next != before {
            events.push(WizardEvent::ContractChanged);
        }
        self.contract = next;

        if validation.pages != self.pages {
            self.pages = validation.pages;
            events.push(WizardEvent::StatusChanged {
                pages: self.pages.clone(),
            });
        }
        if validation.issues != self.issues {
            self.issues = validation.issues;
            events.push(WizardEvent::IssuesChanged {
                issues: self.issues.clone(),
            });
        }
        events
    }
}
