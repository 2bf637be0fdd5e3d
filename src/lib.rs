//! # map-sync
//!
//! Declarative map and marker components kept in sync with an imperative,
//! externally loaded map widget.
//!
//! A host sets properties on a [`MapElement`](element::MapElement) and its
//! child [`MarkerElement`](element::MarkerElement)s. Once per update cycle the
//! changed properties are turned into the smallest set of widget calls: one
//! `setOptions` patch for the map, individual setters for each marker. Widget
//! events (pan, zoom, drag, click) flow back into the same properties and out
//! again as `<name>-changed` notifications, without echoing back to the
//! widget.
//!
//! ## Core Systems
//!
//! - **[`state`]**: property model, validation, change batches tagged by origin
//! - **[`sync`]**: idle gate, options diffing, map/marker/popup controllers
//! - **[`element`]**: the map and marker components and their lifecycle
//! - **[`event`]**: outbound change notifications, inbound widget events
//! - **[`capability`]**: the widget library traits and the script loader
//! - **[`config`]**: initial property values, from code or JSON
//! - **[`geometry`]**: coordinates and viewport bounds
//! - **[`testing`]**: a recording fake library and the headless Pilot

// Foundation
pub mod error;
pub mod geometry;

// Property model
pub mod config;
pub mod state;

// Events and the external library
pub mod capability;
pub mod event;

// Synchronization
pub mod element;
pub mod sync;

// Test support
pub mod testing;
