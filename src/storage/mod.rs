mod dataset;
mod manifest;

pub use dataset::DatasetStore;
pub use manifest::ManifestLog;
