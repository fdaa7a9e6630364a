// src/lib.rs

//! Weighted lottery core: an ordered pool of named, weighted entries, a
//! weighted random selector, a capped history of past draws, JSON
//! persistence to a key-value store, and an async draw orchestrator.

pub mod app_state;
pub mod config;
pub mod draw;
pub mod entry;
pub mod error;
pub mod export;
pub mod file_utils;
pub mod history_manager;
pub mod selector;
pub mod storage;

pub use app_state::AppState;
pub use draw::{DrawEvent, DrawOrchestrator, DrawOutcome, DrawPhase};
pub use entry::{Entry, EntryId, EntryStore};
pub use error::{InvalidStateError, LotteryError, PersistenceError, ValidationError};
pub use history_manager::{ExportRow, HistoryLedger, HistoryRecord};
pub use selector::{select_weighted, RandomSource};
pub use storage::{KeyValueStore, MemoryStore, PersistenceGateway};
