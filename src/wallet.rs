//! The wallet screen.
//!
//! Lists the stored API keys grouped by category and binds one handler per
//! interaction: reveal, copy, rename, delete and re-categorize. Every
//! interaction is one request to the wallet server followed by a local text
//! swap or a full reload of the page.

mod command;
mod controller;
mod dialog;
mod message;
mod page;
mod view;

pub use controller::Wallet;
pub use message::WalletMsg;
pub use page::CategoryFilter;
