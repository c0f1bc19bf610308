pub mod processor;
pub mod types;
pub mod utils;
pub mod writer;

pub use processor::ExcelProcessor;
pub use types::LoadedSheet;
pub use writer::ExcelWriter;
