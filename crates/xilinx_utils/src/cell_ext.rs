use std::cell::RefCell;

/// Extensions for [`RefCell`].
pub trait RefCellExt<T> {
    /// Calls the closure with a mutable reference to the contained value.
    ///
    /// ## Panics
    /// Panics if the [`RefCell`] is already borrowed.
    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> RefCellExt<T> for RefCell<T> {
    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut borrow = self.borrow_mut();
        f(&mut borrow)
    }
}
