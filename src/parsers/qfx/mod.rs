mod dto;
mod parser;
mod types;

pub mod prelude {
    pub use super::dto::QfxTransaction;
    pub use super::parser::QfxParser;
    pub use super::types::{QfxAmount, QfxDate};
}
