//! Common test utilities for torrent-month-filter
//!
//! - Mock rqbit server setup for download tests
//! - Torrent fixtures in the monthly-dump layout

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_server;
