use std::collections::VecDeque;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::HistoryError;
use crate::style::ArtStyle;
use crate::util::time;

/// One completed sketch → AI art (→ story) cycle.
///
/// The sketch and generated images are shared and never change after the
/// entry is created. Story and colouring are filled in later.
#[derive(Clone)]
pub struct HistoryEntry {
    id: Uuid,
    sketch: Arc<[u8]>,
    generated: Arc<[u8]>,
    prompt: Option<String>,
    style: ArtStyle,
    story: Option<String>,
    coloring: Option<Arc<[u8]>>,
    created_at: u64,
}

// Image buffers are summarised, not dumped
impl std::fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("id", &self.id)
            .field("sketch_len", &self.sketch.len())
            .field("generated_len", &self.generated.len())
            .field("prompt", &self.prompt)
            .field("style", &self.style)
            .field("has_story", &self.story.is_some())
            .field("has_coloring", &self.coloring.is_some())
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl HistoryEntry {
    /// Creates an entry from the encoded sketch and the enhanced image
    pub fn new(sketch: impl Into<Arc<[u8]>>, generated: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sketch: sketch.into(),
            generated: generated.into(),
            prompt: None,
            style: ArtStyle::default(),
            story: None,
            coloring: None,
            created_at: time::timestamp_secs(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_style(mut self, style: ArtStyle) -> Self {
        self.style = style;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sketch(&self) -> &[u8] {
        &self.sketch
    }

    pub fn generated(&self) -> &[u8] {
        &self.generated
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn style(&self) -> ArtStyle {
        self.style
    }

    pub fn story(&self) -> Option<&str> {
        self.story.as_deref()
    }

    pub fn coloring(&self) -> Option<&[u8]> {
        self.coloring.as_deref()
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }
}

/// Ordered, capacity-bounded list of history entries with an optional
/// selection.
///
/// Invariants after every operation:
/// - `len() <= capacity()`; the oldest entries are evicted first
/// - `selected()` is `None` or a valid index that keeps pointing at the same
///   entry when entries in front of it are removed
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    selected: Option<usize>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            selected: None,
        })
    }

    /// Adds `entry` at the end, evicting the oldest entry first when the
    /// store is full. Returns the index of the new entry.
    pub fn append(&mut self, entry: HistoryEntry) -> usize {
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::info!("History full, evicting oldest entry {}", evicted.id());
            }
            self.shift_selection_after_removal(0);
        }
        log::info!("Adding history entry {}", entry.id());
        self.entries.push_back(entry);
        self.entries.len() - 1
    }

    /// Marks the entry at `index` as selected and returns it
    pub fn select(&mut self, index: usize) -> Result<&HistoryEntry, HistoryError> {
        self.check_index(index)?;
        self.selected = Some(index);
        Ok(&self.entries[index])
    }

    /// Removes the entry at `index`, keeping the selection on the same
    /// logical entry where possible.
    pub fn delete(&mut self, index: usize) -> Result<HistoryEntry, HistoryError> {
        self.check_index(index)?;
        let removed = self
            .entries
            .remove(index)
            .ok_or(HistoryError::InvalidIndex {
                index,
                len: self.entries.len(),
            })?;
        self.shift_selection_after_removal(index);
        log::info!("Deleted history entry {} at index {}", removed.id(), index);
        Ok(removed)
    }

    /// Sets or overwrites the story of the entry at `index`
    pub fn attach_story(&mut self, index: usize, story: impl Into<String>) -> Result<(), HistoryError> {
        self.check_index(index)?;
        self.entries[index].story = Some(story.into());
        Ok(())
    }

    /// Stores the coloured version of the entry's art, replacing any earlier one
    pub fn attach_coloring(&mut self, index: usize, coloring: impl Into<Arc<[u8]>>) -> Result<(), HistoryError> {
        self.check_index(index)?;
        self.entries[index].coloring = Some(coloring.into());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&HistoryEntry> {
        self.selected.and_then(|index| self.entries.get(index))
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Current index of the entry with the given id, if it is still stored
    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected = None;
    }

    fn check_index(&self, index: usize) -> Result<(), HistoryError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(HistoryError::InvalidIndex {
                index,
                len: self.entries.len(),
            })
        }
    }

    fn shift_selection_after_removal(&mut self, removed: usize) {
        self.selected = match self.selected {
            Some(selected) if selected == removed => None,
            Some(selected) if removed < selected => Some(selected - 1),
            other => other,
        };
    }
}
