pub mod analyzers;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod exams;
pub mod fetch;
pub mod geocode;
pub mod output;
pub mod parser;
pub mod report;
