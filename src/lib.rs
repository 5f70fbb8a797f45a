//! 1-D span filling: choose standard-length pieces that fill a span between
//! two end margins, under four selection strategies, and lay them out.

pub mod error;
pub mod layout;
pub mod recommend;
pub mod render;
pub mod request;
pub mod selector;
pub mod types;

pub use error::{InputError, LayoutError};
pub use layout::{evaluate_all, layout};
pub use recommend::{Recommendation, recommend};
pub use types::{LayoutParams, LayoutResult, PieceCatalog, Selection, Strategy, WastePolicy};
