pub mod columns;
pub mod excel;
pub mod pipeline;
pub mod sentiment;
