//! Starling Forum library.
//!
//! A small web forum: users sign up, log in, create posts and reply to
//! them. Also proxies a third-party currency exchange-rate feed for the
//! rate lookup pages.

pub mod auth;
pub mod config;
pub mod db;
pub mod forum;
pub mod rates;
pub mod web;
