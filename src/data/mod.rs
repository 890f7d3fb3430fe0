//! Dataset loading.
//!
//! Datasets are addressed by name through a [`DatasetRegistry`]. The
//! bundled monthly airline passenger series is always available; other
//! series (for example a gas consumption export) are registered from
//! `date,value` text.

mod csv;
mod registry;

pub use csv::parse_csv;
pub use registry::{load_dataset, DatasetRegistry, AIR_PASSENGERS};
