mod file;

pub use file::{File, FileStatus, FileType};
