pub mod ending_logger;

pub use ending_logger::EndingLogger;
