use crate::bulk::selection::SelectionSnapshot;
use std::hash::Hash;
use std::sync::Arc;

/// An item that can be selected and targeted by a batch.
pub trait Selectable {
    type Id: Eq + Hash + Clone;

    fn id(&self) -> Self::Id;
}

/// The active filter/search state of a page.
pub trait ViewFilter<T>: Clone + PartialEq {
    fn matches(&self, item: &T) -> bool;
}

/// What the page currently shows, derived from items, filter and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<Id> {
    /// Indices into the item collection, in collection order.
    pub visible: Vec<usize>,
    pub visible_ids: Vec<Id>,
    /// `selection ∩ visible`, in collection order.
    pub visible_selection: Vec<Id>,
}

impl<Id> Projection<Id> {
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn all_visible_selected(&self) -> bool {
        !self.visible.is_empty() && self.visible.len() == self.visible_selection.len()
    }
}

pub fn project<T, F>(items: &[T], filter: &F, selection: &SelectionSnapshot<T::Id>) -> Projection<T::Id>
where
    T: Selectable,
    F: ViewFilter<T>,
{
    let mut visible = Vec::new();
    let mut visible_ids = Vec::new();
    let mut visible_selection = Vec::new();

    for (index, item) in items.iter().enumerate() {
        if !filter.matches(item) {
            continue;
        }

        let id = item.id();
        if selection.contains(&id) {
            visible_selection.push(id.clone());
        }
        visible.push(index);
        visible_ids.push(id);
    }

    Projection {
        visible,
        visible_ids,
        visible_selection,
    }
}

struct CachedProjection<T: Selectable, F> {
    items: Arc<Vec<T>>,
    filter: F,
    selection: SelectionSnapshot<T::Id>,
    projection: Arc<Projection<T::Id>>,
}

/// Memoizes [`project`] on its inputs: the item collection by `Arc`
/// identity, the filter by value and the selection by snapshot identity.
pub struct ViewProjector<T: Selectable, F> {
    cached: Option<CachedProjection<T, F>>,
    recomputations: usize,
}

impl<T, F> ViewProjector<T, F>
where
    T: Selectable,
    F: ViewFilter<T>,
{
    pub fn new() -> Self {
        Self {
            cached: None,
            recomputations: 0,
        }
    }

    pub fn project(
        &mut self,
        items: &Arc<Vec<T>>,
        filter: &F,
        selection: &SelectionSnapshot<T::Id>,
    ) -> Arc<Projection<T::Id>> {
        if let Some(cached) = &self.cached {
            if Arc::ptr_eq(&cached.items, items)
                && cached.filter == *filter
                && cached.selection.same_as(selection)
            {
                return cached.projection.clone();
            }
        }

        let projection = Arc::new(project(items.as_slice(), filter, selection));
        self.recomputations += 1;
        self.cached = Some(CachedProjection {
            items: items.clone(),
            filter: filter.clone(),
            selection: selection.clone(),
            projection: projection.clone(),
        });
        projection
    }

    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

impl<T, F> Default for ViewProjector<T, F>
where
    T: Selectable,
    F: ViewFilter<T>,
{
    fn default() -> Self {
        Self::new()
    }
}
