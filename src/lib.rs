//! Food diary backend: add-item form submission, previous-entries lookup
//! and the daily log, over a pluggable nutrition data store.

pub mod app;
pub mod config;
pub mod dates;
pub mod diary;
pub mod entries;
pub mod form;
pub mod lookup;
pub mod nutrients;
pub mod photos;
pub mod rejection;
pub mod state;
pub mod storage;
