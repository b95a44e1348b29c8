pub mod csv_write;
pub mod excel_read;
pub mod media;
