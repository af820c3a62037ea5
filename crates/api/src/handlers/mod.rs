pub mod downloads;
pub mod exports;
pub mod uploads;
pub mod urls;
