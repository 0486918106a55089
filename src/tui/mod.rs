pub mod app;
pub mod message;
pub mod reader_task;
pub mod ui;
