//! Terminal choropleth and bar chart of AI task energy use.
//!
//! Country boundaries are shaded by one of two per-region metrics (primary
//! energy or abiotic depletion impact). Dataset labels are resolved to map
//! features through configurable alias and aggregate-region tables; features
//! without data of their own can borrow an aggregate region's figures. A
//! second view plots the average energy of individual AI tasks.

pub mod app;
pub mod braille;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod map;
pub mod metric;
pub mod resolve;
pub mod ui;
