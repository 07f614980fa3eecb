mod base;
mod filesystem;

pub use base::ResultStore;
pub use filesystem::FilesystemResultStore;
