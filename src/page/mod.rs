//! Page retrieval and stream descriptor extraction.
//!
//! - [`PageClient`] - reqwest wrapper used for detail pages, series pages and
//!   the search API
//! - [`find_player_url`] / [`parse_player_params`] - locate the embedded
//!   player on a detail page and read its stream parameters
//! - [`find_show_urls`] - list the show links on a series page

mod client;
mod error;
mod extract;

pub use client::{CONNECT_TIMEOUT_SECS, PageClient, READ_TIMEOUT_SECS};
pub use error::PageError;
pub use extract::{PlayerParams, find_player_url, find_show_urls, parse_player_params};
