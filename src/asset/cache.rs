use super::Handle;

/// Slot-based storage handing out [`Handle`]s.
///
/// `M` is the handle marker; it defaults to the stored type but lets a
/// backend store its own resource structs behind backend-neutral ids.
/// Removed slots are never reused, so a stale handle resolves to `None`.
pub struct AssetCache<T, M = T> {
    items: Vec<Option<T>>,
    live: usize,
    _marker: std::marker::PhantomData<fn() -> M>,
}

impl<T, M> AssetCache<T, M> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            live: 0,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn insert(&mut self, item: T) -> Handle<M> {
        let index = self.items.len();
        self.items.push(Some(item));
        self.live += 1;
        Handle::new(index)
    }

    pub fn get(&self, handle: Handle<M>) -> Option<&T> {
        self.items.get(handle.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, handle: Handle<M>) -> Option<&mut T> {
        self.items.get_mut(handle.index()).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, handle: Handle<M>) -> Option<T> {
        let removed = self.items.get_mut(handle.index()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl<T, M> Default for AssetCache<T, M> {
    fn default() -> Self {
        Self::new()
    }
}
