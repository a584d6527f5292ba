//! Heirloom Owner Wizard
//!
//! The engine behind the four-page wizard an owner uses to spend from, or
//! reset the timer on, a time-locked inheritance output.
//!
//! # Pages
//!
//! 1. Input backup: key, locking address, script, lock length
//! 2. From where: UTXOs to spend
//! 3. To where: destination, amount, fee rate, change
//! 4. Transaction: the unsigned draft
//!
//! # Example
//!
//! ```ignore
//! use heirloom_tx::BitcoinPrimitives;
//! use heirloom_wizard::{OwnerSession, WizardConfig};
//!
//! let mut config = WizardConfig::from_file(Path::new("heirloom.toml"))?;
//! config.apply_env_overrides();
//! config.validate()?;
//!
//! let mut session = OwnerSession::new(BitcoinPrimitives::new(), config);
//! session.change_file(ContractBackup::load(Path::new("backup.json"))?);
//! for event in session.change_contract_values(ContractUpdate::new().with_fee_rate("3")) {
//!     println!("{:?}", event);
//! }
//! ```

pub mod config;
pub mod events;
pub mod pages;
pub mod reconcile;
pub mod session;
pub mod validate;

pub use config::WizardConfig;
pub use events::WizardEvent;
pub use pages::{PageNavigator, PageStatus, Pages, PAGE_COUNT};
pub use reconcile::{reconcile, reconcile_amounts, reconcile_inputs};
pub use session::OwnerSession;
pub use validate::{validate, validate_with_min_fee, IssuesReport, Page3Issue, Validation};
