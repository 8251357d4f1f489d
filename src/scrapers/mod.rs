//! The search-results scraping pipeline.
//!
//! A run flows through three layers, each in its own module:
//!
//! 1. [`session`]: opens the site, submits the query, applies the sort order
//!    and owns the browser for the whole run
//! 2. [`paginate`]: walks the result pages until the page limit or the last page
//! 3. [`extract`]: turns each result element into a record, downloading its
//!    thumbnail and running the text analysis
//!
//! Failures are absorbed at the narrowest layer that can recover: a missing
//! field defaults inside [`extract`], a result list that never loads ends the
//! crawl in [`paginate`], and [`session`] turns any error into a partial
//! report.

pub mod extract;
pub mod paginate;
pub mod session;

pub use session::{SearchSession, Termination};
