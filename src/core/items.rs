use std::sync::RwLock;

/// One selectable item. `value` is the identity key (the HTML option value);
/// `text` is the display label and may be empty; `group` carries the optgroup
/// label for grouped entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectItem {
    pub value: String,
    pub text: String,
    pub group: Option<String>,
    pub selected: bool,
    pub hidden: bool,
}

impl SelectItem {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Seam between the controller and whatever owns the rendered option views.
/// The controller only decides what the current result set is; it never
/// renders. Implementations must tolerate calls from overlapping async tasks.
pub trait ItemSource: Send + Sync {
    /// Snapshot of every item, hidden or not.
    fn items(&self) -> Vec<SelectItem>;

    /// Replace the current result set (fresh `search`).
    fn replace(&self, items: Vec<SelectItem>);

    /// Append to the current result set (`load_more`).
    fn append(&self, items: Vec<SelectItem>);

    /// Items currently marked selected.
    fn selected(&self) -> Vec<SelectItem>;

    /// Keep only the given values visible; everything else is hidden.
    fn apply_filter(&self, visible: &[String]);

    /// Undo any visibility filtering.
    fn clear_filter(&self);

    /// Toggle the empty-result ("not found") UI state.
    fn set_not_found(&self, not_found: bool);
}

#[derive(Debug, Default)]
struct Inner {
    items: Vec<SelectItem>,
    not_found: bool,
}

/// Thread-safe in-memory item source, the default collaborator for local
/// search and the reference implementation for tests.
#[derive(Debug, Default)]
pub struct MemoryItemSource {
    inner: RwLock<Inner>,
}

impl MemoryItemSource {
    pub fn new(items: Vec<SelectItem>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                items,
                not_found: false,
            }),
        }
    }

    /// Convenience constructor for tests: value and text share the label.
    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| SelectItem::new(*t, *t)).collect())
    }

    pub fn visible_items(&self) -> Vec<SelectItem> {
        self.items().into_iter().filter(|i| !i.hidden).collect()
    }

    pub fn is_not_found(&self) -> bool {
        self.inner.read().map(|inner| inner.not_found).unwrap_or(false)
    }

    pub fn set_selected(&self, value: &str, selected: bool) {
        if let Ok(mut inner) = self.inner.write() {
            for item in inner.items.iter_mut().filter(|i| i.value == value) {
                item.selected = selected;
            }
        }
    }
}

impl ItemSource for MemoryItemSource {
    fn items(&self) -> Vec<SelectItem> {
        self.inner
            .read()
            .map(|inner| inner.items.clone())
            .unwrap_or_default()
    }

    fn replace(&self, items: Vec<SelectItem>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.items = items;
        }
    }

    fn append(&self, items: Vec<SelectItem>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.items.extend(items);
        }
    }

    fn selected(&self) -> Vec<SelectItem> {
        self.inner
            .read()
            .map(|inner| inner.items.iter().filter(|i| i.selected).cloned().collect())
            .unwrap_or_default()
    }

    fn apply_filter(&self, visible: &[String]) {
        if let Ok(mut inner) = self.inner.write() {
            for item in inner.items.iter_mut() {
                item.hidden = !visible.contains(&item.value);
            }
        }
    }

    fn clear_filter(&self) {
        if let Ok(mut inner) = self.inner.write() {
            for item in inner.items.iter_mut() {
                item.hidden = false;
            }
        }
    }

    fn set_not_found(&self, not_found: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.not_found = not_found;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_append() {
        let source = MemoryItemSource::from_texts(&["Apple"]);
        source.append(vec![SelectItem::new("b", "Banana")]);
        assert_eq!(source.items().len(), 2);

        source.replace(vec![SelectItem::new("c", "Cherry")]);
        let items = source.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "Cherry");
    }

    #[test]
    fn test_filtering_hides_and_restores() {
        let source = MemoryItemSource::from_texts(&["Apple", "Banana", "Cherry"]);
        source.apply_filter(&["Banana".to_string()]);
        let visible = source.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "Banana");

        source.clear_filter();
        assert_eq!(source.visible_items().len(), 3);
    }

    #[test]
    fn test_selection_tracking() {
        let source = MemoryItemSource::from_texts(&["Apple", "Banana"]);
        assert!(source.selected().is_empty());

        source.set_selected("Apple", true);
        let selected = source.selected();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "Apple");
    }

    #[test]
    fn test_not_found_flag() {
        let source = MemoryItemSource::default();
        assert!(!source.is_not_found());
        source.set_not_found(true);
        assert!(source.is_not_found());
        source.set_not_found(false);
        assert!(!source.is_not_found());
    }
}
