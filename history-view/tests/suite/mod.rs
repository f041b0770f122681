// Aggregates all integration tests as modules.
mod config;
mod context_menu;
mod enumeration;
mod geometry;
mod harness;
mod mouse;
mod paint;
mod selection;
mod touch;
