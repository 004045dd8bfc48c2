//! The merge pipeline: chapter documents in, one combined document out.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::characters::{CharacterRegistry, assign_character_ids};
use crate::discover::list_chapter_files;
use crate::error::Result;
use crate::renumber::{OffsetMode, SpanCounter, renumber_document};
use crate::xml::{Document, Element, Node, read_document, write_document};

/// Root element of the merged document.
pub const ROOT_TAG: &str = "doc";
/// Block holding the deduplicated characters.
pub const CHARACTERS_TAG: &str = "characters";
/// Block holding the concatenated chapter content.
pub const TEXT_TAG: &str = "text";
/// Per-chapter wrapper used in sectioned output.
pub const CHAPTER_TAG: &str = "chapter";

/// Options controlling how chapters are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssembleOptions {
    /// Wrap each chapter's content in a `chapter` element.
    pub section_tags: bool,
    pub offset_mode: OffsetMode,
}

impl AssembleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section_tags(mut self, section_tags: bool) -> Self {
        self.section_tags = section_tags;
        self
    }

    pub fn with_offset_mode(mut self, offset_mode: OffsetMode) -> Self {
        self.offset_mode = offset_mode;
        self
    }
}

/// One input file, parsed.
#[derive(Debug, Clone)]
pub struct ChapterSource {
    pub path: PathBuf,
    pub document: Document,
}

impl ChapterSource {
    pub fn new(path: impl Into<PathBuf>, document: Document) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }
}

/// Counts describing a finished merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssemblySummary {
    pub files: usize,
    pub chapters: usize,
    pub characters: usize,
    pub duplicate_characters: usize,
    pub spans_renumbered: usize,
    /// Offset a further file would have received.
    pub next_span_offset: u64,
    pub options: AssembleOptions,
}

/// The merged document and what went into it.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub document: Document,
    pub summary: AssemblySummary,
}

impl Assembly {
    /// Serialize the merged document to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_document(&self.document, path)
    }
}

/// Per-run state threaded through the fold over chapter files.
#[derive(Default)]
struct MergeState {
    counter: SpanCounter,
    registry: CharacterRegistry,
    characters: Vec<Element>,
    chapters: Vec<Vec<Node>>,
}

impl MergeState {
    fn absorb(mut self, source: &ChapterSource, mode: OffsetMode) -> Result<Self> {
        let (renumbered, counter) =
            renumber_document(&source.document, self.counter, mode, &source.path)?;
        let (root, retained) = assign_character_ids(&renumbered.root, &mut self.registry);

        let texts = root.find_all(TEXT_TAG);
        tracing::debug!(
            file = %source.path.display(),
            chapters = texts.len(),
            new_characters = retained.len(),
            span_offset = counter.offset(),
            "merged chapter file"
        );

        self.chapters
            .extend(texts.into_iter().map(|text| text.children.clone()));
        self.characters.extend(retained);
        self.counter = counter;
        Ok(self)
    }
}

/// Merge already parsed chapter documents, in the order given.
pub fn assemble_documents(sources: &[ChapterSource], options: AssembleOptions) -> Result<Assembly> {
    let state = sources
        .iter()
        .try_fold(MergeState::default(), |state, source| {
            state.absorb(source, options.offset_mode)
        })?;

    let summary = AssemblySummary {
        files: sources.len(),
        chapters: state.chapters.len(),
        characters: state.characters.len(),
        duplicate_characters: state.registry.duplicates(),
        spans_renumbered: state.counter.spans_renumbered(),
        next_span_offset: state.counter.offset(),
        options,
    };

    let document = build_output(state.characters, state.chapters, options.section_tags);
    Ok(Assembly { document, summary })
}

/// Discover, parse and merge every chapter file in `dir`.
pub fn assemble_dir(dir: &Path, options: AssembleOptions) -> Result<Assembly> {
    let files = list_chapter_files(dir)?;
    if files.is_empty() {
        tracing::warn!(dir = %dir.display(), "no chapter files found");
    }

    let mut sources = Vec::with_capacity(files.len());
    for file in &files {
        tracing::debug!(file = %file.file_name, part = ?file.part, "reading chapter");
        sources.push(ChapterSource::new(&file.path, read_document(&file.path)?));
    }

    let assembly = assemble_documents(&sources, options)?;
    tracing::info!(
        files = assembly.summary.files,
        chapters = assembly.summary.chapters,
        characters = assembly.summary.characters,
        "assembled chapters"
    );
    Ok(assembly)
}

/// Default output location: the input directory name with `.xml` appended.
pub fn default_output_path(input_dir: &Path) -> PathBuf {
    let trimmed = input_dir
        .to_string_lossy()
        .trim_end_matches(['/', std::path::MAIN_SEPARATOR])
        .to_string();
    if trimmed.is_empty() {
        // input was the filesystem root
        return PathBuf::from(format!("{}.xml", input_dir.display()));
    }
    PathBuf::from(format!("{trimmed}.xml"))
}

fn build_output(characters: Vec<Element>, chapters: Vec<Vec<Node>>, section_tags: bool) -> Document {
    let mut characters_elem = Element::new(CHARACTERS_TAG);
    characters_elem
        .children
        .extend(characters.into_iter().map(Node::Element));

    let mut text_elem = Element::new(TEXT_TAG);
    for content in chapters {
        if section_tags {
            let mut chapter = Element::new(CHAPTER_TAG);
            chapter.children = content;
            text_elem.children.push(Node::text("\n"));
            text_elem.children.push(Node::Element(chapter));
        } else {
            text_elem.children.extend(content);
        }
    }

    let root = Element::new(ROOT_TAG)
        .with_child(characters_elem)
        .with_child(Node::text("\n"))
        .with_child(text_elem);
    Document::new(root)
}
