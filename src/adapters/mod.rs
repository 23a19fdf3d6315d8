pub mod database;
pub mod printer;
pub mod storage;
