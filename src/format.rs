use std::fmt::{Debug, Formatter, Result};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::shape::{Extents, Shape};
use crate::view::{View, ViewMut};

/// Elements at a pointer, nested by the extents in row-major order.
pub(crate) struct Nested<'a, T, E: Extents> {
    ptr: NonNull<T>,
    extents: E,
    phantom: PhantomData<&'a T>,
}

impl<'a, T, E: Extents> Nested<'a, T, E> {
    pub(crate) fn new(ptr: NonNull<T>, extents: E) -> Self {
        Self { ptr, extents, phantom: PhantomData }
    }

    /// Returns the elements for each index in the outer dimension, or `None` for a scalar.
    pub(crate) fn outer(&self) -> Option<impl ExactSizeIterator<Item = Nested<'a, T, E::Tail>>> {
        let (ptr, tail, stride) = (self.ptr, self.extents.tail(), self.extents.stride());

        (E::RANK > 0).then(|| {
            (0..self.extents.size()).map(move |i| Nested {
                ptr: unsafe { ptr.add(stride * i) },
                extents: tail,
                phantom: PhantomData,
            })
        })
    }

    /// Returns the element of a scalar.
    pub(crate) fn scalar(&self) -> &'a T {
        debug_assert!(E::RANK == 0, "not a scalar");

        unsafe { &*self.ptr.as_ptr() }
    }
}

impl<T: Debug, E: Extents> Debug for Nested<'_, T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.outer() {
            Some(outer) => f.debug_list().entries(outer).finish(),
            None => self.scalar().fmt(f),
        }
    }
}

impl<T: Debug, S: Shape> Debug for View<'_, T, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.raw_parts() {
            (Some(ptr), shape) => Nested::new(ptr, shape).fmt(f),
            (None, _) => f.debug_list().finish(),
        }
    }
}

impl<T: Debug, S: Shape> Debug for ViewMut<'_, T, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.as_view().fmt(f)
    }
}
