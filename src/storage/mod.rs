pub mod csv_file;
pub mod history;
pub mod table;
