pub mod db;
pub mod keti;
pub mod logging;
pub mod prr;
pub mod storage;
pub mod tinyos;
