use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, shared container for long-lived systems.
///
/// `StSystem` provides shared ownership with interior mutability for a value of
/// type `T` in a single-threaded context. It is used to thread the GPU device,
/// queue and similar systems through the renderer without lifetimes bleeding
/// into every signature. The container uses `Rc<RefCell<Box<T>>>` internally.
///
/// # Examples
///
/// ```
/// use voxel_mesher::core::StSystem;
///
/// let system = StSystem::new(Box::new(42u32));
/// assert_eq!(**system.get(), 42);
///
/// *system.get_mut() = Box::new(100u32);
/// assert_eq!(**system.get(), 100);
/// ```
///
/// # Panics
/// - Panics if a borrow is held while trying to mutably borrow
/// - Panics if a mutable borrow is held while trying to borrow
pub struct StSystem<T: ?Sized> {
    pub system: Rc<RefCell<Box<T>>>,
}

impl<T: 'static + ?Sized> StSystem<T> {
    /// Returns an immutable reference to the contained system.
    ///
    /// # Panics
    /// Panics if the value is currently mutably borrowed.
    pub fn get(&self) -> Ref<'_, Box<T>> {
        self.system.borrow()
    }

    /// Returns a mutable reference to the contained system.
    ///
    /// # Panics
    /// Panics if the value is currently borrowed.
    pub fn get_mut(&self) -> RefMut<'_, Box<T>> {
        self.system.borrow_mut()
    }
}

impl<T: ?Sized> StSystem<T> {
    /// Creates a new `StSystem` containing the given boxed system.
    pub fn new(system: Box<T>) -> Self {
        Self {
            system: Rc::new(RefCell::new(system)),
        }
    }
}

impl<T> Clone for StSystem<T> {
    fn clone(&self) -> Self {
        Self {
            system: self.system.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_system() {
        let system = StSystem::new(Box::new(vec![1, 2, 3]));
        let clone = system.clone();

        clone.get_mut().push(4);

        assert_eq!(system.get().len(), 4);
    }
}
