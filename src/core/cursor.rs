//! Paginated list cursor bound to the entity it browses
//!
//! Both the selection and the scroll offset are tagged with the context key
//! (block hash, txid, wallet snapshot) they were created for. Reading or
//! moving a cursor against any other key is a no-op, so a stale cursor can
//! never index into a newly loaded entity.

use std::ops::Range;

use super::error::NavError;

#[derive(Debug, Clone)]
pub struct ListCursor<K> {
    selected: Option<(usize, K)>,
    offset: Option<(usize, K)>,
    window: usize,
}

impl<K: PartialEq + Clone> ListCursor<K> {
    pub fn new(window: usize) -> Self {
        Self {
            selected: None,
            offset: None,
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Replace selection and offset wholesale for a new context.
    pub fn jump_to(&mut self, key: K, initial_index: usize) {
        self.selected = Some((initial_index, key.clone()));
        self.offset = Some((initial_index, key));
    }

    /// Move to a new context that shows the same list, selecting `index`.
    /// The previous scroll offset is kept where it still shows the selection,
    /// otherwise it is moved by the least amount that does.
    pub fn carry_to(&mut self, key: K, index: usize) {
        let previous = self.offset.as_ref().map_or(index, |(offset, _)| *offset);
        let lowest = (index + 1).saturating_sub(self.window);
        let offset = previous.clamp(lowest, index);
        self.selected = Some((index, key.clone()));
        self.offset = Some((offset, key));
    }

    /// Key the cursor currently belongs to
    pub fn context(&self) -> Option<&K> {
        self.selected.as_ref().map(|(_, key)| key)
    }

    fn valid_for(&self, key: &K) -> Option<(usize, usize)> {
        match (&self.selected, &self.offset) {
            (Some((index, sel_key)), Some((offset, off_key))) if sel_key == key && off_key == key => {
                Some((*index, *offset))
            }
            _ => None,
        }
    }

    pub fn selected(&self, key: &K) -> Option<usize> {
        self.valid_for(key).map(|(index, _)| index)
    }

    pub fn offset(&self, key: &K) -> Option<usize> {
        self.valid_for(key).map(|(_, offset)| offset)
    }

    /// Indices currently inside the visible window
    pub fn visible(&self, key: &K, len: usize) -> Range<usize> {
        match self.offset(key) {
            Some(offset) => {
                let start = offset.min(len);
                start..(start + self.window).min(len)
            }
            None => 0..0,
        }
    }

    /// Move the selection up by one. Returns whether anything moved.
    pub fn select_previous(&mut self, key: &K) -> bool {
        let Some((index, offset)) = self.valid_for(key) else {
            return false;
        };
        if index == 0 {
            return false;
        }

        if index == offset {
            self.offset = Some((offset - 1, key.clone()));
        }
        self.selected = Some((index - 1, key.clone()));
        true
    }

    /// Move the selection down by one within a list of `len` items.
    pub fn select_next(&mut self, key: &K, len: usize) -> bool {
        let Some((index, offset)) = self.valid_for(key) else {
            return false;
        };
        if index + 1 >= len {
            return false;
        }

        if index + 1 >= offset + self.window {
            self.offset = Some((offset + 1, key.clone()));
        }
        self.selected = Some((index + 1, key.clone()));
        true
    }

    /// The selected item, for a drill-down action.
    pub fn resolve<'a, T>(&self, key: &K, items: &'a [T]) -> Result<&'a T, NavError> {
        self.selected(key)
            .and_then(|index| items.get(index))
            .ok_or(NavError::NoSelection)
    }

    /// Like [`resolve`](Self::resolve), but the item must also map to a target.
    pub fn resolve_with<'a, T, U>(
        &self,
        key: &K,
        items: &'a [T],
        target: impl FnOnce(&'a T) -> Option<U>,
    ) -> Result<U, NavError> {
        self.resolve(key, items)
            .ok()
            .and_then(target)
            .ok_or(NavError::NoSelection)
    }
}
