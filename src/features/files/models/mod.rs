mod file;

pub use file::{basename, FileColumn, FileRecord, NewFileRecord, FILE_COLUMNS};
