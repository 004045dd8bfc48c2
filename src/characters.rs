//! Character deduplication and id assignment.

use std::collections::HashMap;
use std::convert::Infallible;

use crate::xml::{Attribute, Element};

/// Names seen so far, with the dense id assigned to each.
#[derive(Debug, Default)]
pub struct CharacterRegistry {
    ids: HashMap<String, usize>,
    duplicates: usize,
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name. Returns the new id on first sight, `None` afterwards.
    pub fn claim(&mut self, name: &str) -> Option<usize> {
        if self.ids.contains_key(name) {
            self.duplicates += 1;
            return None;
        }
        let id = self.ids.len();
        self.ids.insert(name.to_string(), id);
        Some(id)
    }

    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// How many `claim` calls hit an already registered name.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Stamp first occurrences of each `character` name with their new id.
///
/// Returns the rewritten tree and copies of the retained characters in the
/// order their ids were assigned. Duplicates keep their attributes in the
/// tree but are not returned. A missing `name` counts as the empty name.
pub fn assign_character_ids(
    root: &Element,
    registry: &mut CharacterRegistry,
) -> (Element, Vec<Element>) {
    let mut ordinal = 0usize;
    let mut retained_ordinals = Vec::new();

    let rewritten = root
        .rewrite(&mut |element: &Element| -> Result<Option<Vec<Attribute>>, Infallible> {
            if element.name != "character" {
                return Ok(None);
            }
            let position = ordinal;
            ordinal += 1;

            let name = element.attr("name").unwrap_or_default();
            match registry.claim(name) {
                Some(id) => {
                    retained_ordinals.push(position);
                    let mut copy = element.clone();
                    copy.set_attr("id", id.to_string());
                    Ok(Some(copy.attrs))
                }
                None => {
                    tracing::debug!(name, "dropping duplicate character");
                    Ok(None)
                }
            }
        })
        .unwrap_or_else(|never| match never {});

    // Pre-order positions survive the rewrite, so the retained elements can be
    // picked out of the new tree with their (possibly nested) updates intact.
    let all = rewritten.find_all("character");
    let retained = retained_ordinals
        .into_iter()
        .map(|i| all[i].clone())
        .collect();

    (rewritten, retained)
}
