//! # League Engine
//!
//! Placement scoring and leaderboard engine for darts tournament leagues.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (tournaments, brackets, scoring rules,
//!   result rows, leaderboard entries)
//! - **calculate**: Pure computation (freshness overlay, placement
//!   extraction, point resolution, leaderboard aggregation)
//! - **storage**: Store abstraction and the JSONL data-lake implementation
//! - **service**: Orchestration (placement recorder, leaderboard updates,
//!   league linkage, membership, player merge)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod service;
pub mod storage;

pub use models::*;
