mod base;

pub use base::JobStatusStore;
