pub mod data_tools;
pub mod text_output;
