//! Styled-text tree held by each cell, and its markup form.

pub mod markup;
pub mod node;
pub mod props;

pub use markup::MarkupError;
pub use node::{plain_text, Element, Node, Tag};
pub use props::{Alignment, PropertyKind, StyleProps};
