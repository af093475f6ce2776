mod entry;
mod status;

pub use entry::Entry;
pub use status::FileStatus;
