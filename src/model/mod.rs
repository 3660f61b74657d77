//! Document model types for exam booklet geometry.
//!
//! This module defines the intermediate representation shared by the PDF
//! parser and the question segmentation engine: pages with positioned text
//! lines and blocks, rectangles in top-down page space, and the question
//! positions and regions derived from them.

mod document;
mod geometry;
mod page;
mod question;

pub use document::{Document, Metadata};
pub use geometry::{Interval, Rect};
pub use page::{Page, TextBlock, TextLine};
pub use question::{QuestionClip, QuestionPosition, QuestionRects};
