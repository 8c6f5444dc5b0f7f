//! git-promote - promote whitelisted paths into an upstream pull request
//!
//! Keeps a fork (`origin`) and the canonical repository (`upstream`) in sync
//! for a target branch, copies only the whitelisted paths from a local source
//! branch onto it, and files or amends a review request while tracking which
//! files have already been proposed.

pub mod auth;
pub mod config;
pub mod error;
pub mod inspect;
pub mod platform;
pub mod policy;
pub mod repo;
pub mod sync;
pub mod tracker;
pub mod types;
pub mod workflow;
