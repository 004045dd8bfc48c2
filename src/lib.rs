//! # partbind
//!
//! Merge a directory of per-chapter annotated XML files into one document.
//!
//! Each chapter file carries `character` elements and one or more `text`
//! elements whose content is annotated with `quote` and `mention` spans.
//! Merging:
//!
//! - orders files by the part number in their name (`emma-2.xml` before
//!   `emma-10.xml`), unnumbered files first
//! - keeps the first `character` of each name and gives it a dense id
//! - shifts span ids and `connection` references so they stay unique
//! - concatenates the `text` content, optionally wrapped per chapter
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use partbind::{AssembleOptions, assemble_dir, default_output_path};
//!
//! let input = Path::new("emma");
//! let assembly = assemble_dir(input, AssembleOptions::new().with_section_tags(true))?;
//! assembly.write_to(&default_output_path(input))?;
//! # Ok::<(), partbind::Error>(())
//! ```

pub mod assemble;
pub mod characters;
pub mod discover;
pub mod error;
pub mod renumber;
pub mod span;
pub(crate) mod util;
pub mod xml;

pub use assemble::{
    AssembleOptions, Assembly, AssemblySummary, ChapterSource, assemble_dir, assemble_documents,
    default_output_path,
};
pub use discover::{ChapterFile, list_chapter_files, part_number};
pub use error::{Error, Result};
pub use renumber::OffsetMode;
pub use span::{SpanId, SpanKind};
pub use xml::{Document, Element, Node};
