//! Backend bridge: the command queue from the UI and the worker that drives the catalog controller.

pub mod commands;
pub mod runtime;
