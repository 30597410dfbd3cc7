//! Synchronization engine for the Codex environment sidebar.
//!
//! The host page (the Codex task list) owns every node this crate touches.
//! Environments are only visible while the host's environment popover is
//! open, and task rows come and go as the user scrolls. The engine treats
//! that document as an eventually-consistent source: it discovers the
//! environment vocabulary by polling the popover, keeps the user's
//! selection and favorites durable, hides rows that do not match the
//! selection, and hides section headers left empty by the filter.
//!
//! Browser specifics live behind three seams: [`HostDocument`], [`View`] and
//! [`Scheduler`]. The `codex-sidebar-web` crate implements them on top of
//! `web-sys`; tests use the in-memory document from [`testing`].

mod category;
mod config;
mod discovery;
mod engine;
mod error;
mod filter;
mod host;
mod route;
mod runtime;
mod sections;
mod selection;
mod store;
mod view;
mod watcher;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use category::CATEGORY_SEPARATOR;
pub use category::Category;
pub use category::CategorySet;
pub use category::looks_like_category;
pub use config::HostSelectors;
pub use config::OverlayLabels;
pub use config::RouteConfig;
pub use config::SidebarConfig;
pub use config::StorageKeys;
pub use config::TimingConfig;
pub use discovery::DiscoveryOutcome;
pub use discovery::EntityDiscovery;
pub use engine::IntentSink;
pub use engine::SidebarEngine;
pub use error::ConfigError;
pub use error::StoreError;
pub use filter::CategoryExtractor;
pub use filter::FilterEngine;
pub use filter::FilterReport;
pub use filter::LastTokenExtractor;
pub use host::HostDocument;
pub use host::Location;
pub use host::MutationBatch;
pub use route::RouteGate;
pub use route::RouteSubscription;
pub use route::normalize_path;
#[cfg(feature = "tokio")]
pub use runtime::TokioScheduler;
pub use runtime::Scheduler;
pub use sections::SectionReconciler;
pub use sections::SectionReport;
pub use selection::Reconciliation;
pub use selection::SelectOutcome;
pub use selection::SelectionState;
pub use store::KeyValueStore;
pub use store::MemoryStore;
pub use store::PersistenceStore;
pub use view::RenderModel;
pub use view::SidebarEntry;
pub use view::View;
pub use view::ViewIntent;
pub use watcher::ChangeWatcher;
pub use watcher::OwnedRegions;
