pub mod resume_chunk;
pub mod resume_file;
