pub mod csv_read;
pub mod json_write;
