//! Remote access to the ERP's REST Data Services catalog.

pub mod client;
pub mod pager;

pub use client::{ApexClient, FetchError, Page};
pub use pager::{OffsetPager, PageReader};
