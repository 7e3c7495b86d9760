use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::ptr::NonNull;
use std::slice;

use crate::check::{self, ViewError};
use crate::dim::Dim;
use crate::iter::{AxisIter, AxisIterMut};
use crate::shape::{Extents, IntoShape, Shape};

/// Multidimensional array view into a borrowed buffer.
///
/// The view does not own the elements, and copying it is cheap. Indexing the
/// outermost dimension gives a view with one dimension less, or a reference
/// to an element for a one-dimensional view.
///
/// A view can be null, in which case it has no elements and every dimension
/// has size zero. Indexing a null view is a precondition violation.
pub struct View<'a, T, S: Shape> {
    ptr: Option<NonNull<T>>,
    shape: S,
    phantom: PhantomData<&'a T>,
}

/// Mutable multidimensional array view into a borrowed buffer.
///
/// The view has exclusive access to the elements, like a mutable slice.
pub struct ViewMut<'a, T, S: Shape> {
    ptr: Option<NonNull<T>>,
    shape: S,
    phantom: PhantomData<&'a mut T>,
}

macro_rules! impl_view {
    ($name:tt, $view:tt, $raw_mut:tt, {$($mut:tt)?}) => {
        impl<'a, T, S: Shape> $view<'a, T, S> {
            /// Creates an array view of the buffer with the specified shape.
            ///
            /// # Panics
            ///
            /// Panics if a deferred size is zero, if the number of elements overflows,
            /// or if the buffer is too small.
            #[track_caller]
            pub fn new(data: &'a $($mut)? [T], shape: impl IntoShape<IntoShape = S>) -> Self {
                check::checked(concat!($name, "::new"), Self::try_new(data, shape))
            }

            /// Creates an array view of the buffer with the specified shape, or
            /// returns an error if a deferred size is zero, the number of elements
            /// overflows or the buffer is too small.
            pub fn try_new(
                data: &'a $($mut)? [T],
                shape: impl IntoShape<IntoShape = S>,
            ) -> Result<Self, ViewError> {
                let shape = shape.into_shape();

                shape.validate()?;

                if data.len() < shape.len() {
                    return Err(ViewError::BufferTooSmall { len: data.len(), required: shape.len() });
                }

                unsafe { Ok(Self::from_parts(NonNull::new(data.as_ptr() as *mut T), shape)) }
            }

            /// Creates an array view of the buffer with sizes for the deferred
            /// dimensions, ordered from the outermost.
            ///
            /// # Panics
            ///
            /// Panics if the number of sizes is not matching the deferred dimensions,
            /// if a size is zero, or if the buffer is too small.
            #[track_caller]
            pub fn with_deferred(data: &'a $($mut)? [T], sizes: &[usize]) -> Self {
                check::checked(
                    concat!($name, "::with_deferred"),
                    Self::try_with_deferred(data, sizes),
                )
            }

            /// Creates an array view of the buffer with sizes for the deferred
            /// dimensions, or returns an error if the sizes are invalid.
            pub fn try_with_deferred(
                data: &'a $($mut)? [T],
                sizes: &[usize],
            ) -> Result<Self, ViewError> {
                Self::try_new(data, S::from_deferred(sizes)?)
            }

            /// Creates an array view from a raw pointer and a shape.
            ///
            /// A null pointer gives a null view.
            ///
            /// # Safety
            ///
            /// If the pointer is not null, it must be valid for the number of elements
            /// in the shape during the lifetime `'a`, with the same aliasing rules as
            /// for a slice reference of that lifetime.
            ///
            /// # Panics
            ///
            /// Panics if a deferred size is zero, or if the number of elements overflows.
            #[track_caller]
            pub unsafe fn from_raw_parts(
                ptr: *$raw_mut T,
                shape: impl IntoShape<IntoShape = S>,
            ) -> Self {
                let shape = shape.into_shape();

                check::checked(concat!($name, "::from_raw_parts"), shape.validate());

                unsafe { Self::from_parts(NonNull::new(ptr as *mut T), shape) }
            }

            /// Creates a null array view.
            pub fn null() -> Self {
                unsafe { Self::from_parts(None, S::default()) }
            }

            /// Returns the number of elements in the specified dimension, counted
            /// from the outermost, or zero for a null view.
            ///
            /// # Panics
            ///
            /// Panics if the dimension is out of bounds.
            #[track_caller]
            pub fn dim(&self, index: usize) -> usize {
                check::checked(concat!($name, "::dim"), self.try_dim(index))
            }

            /// Returns the number of elements in the specified dimension, or an error
            /// if the dimension is out of bounds.
            pub fn try_dim(&self, index: usize) -> Result<usize, ViewError> {
                if index >= S::RANK {
                    return Err(ViewError::DimOutOfRange { dim: index, rank: S::RANK });
                }

                Ok(if self.is_null() { 0 } else { self.shape.dim(index) })
            }

            /// Returns `true` if the array view contains no elements.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Returns `true` if the array view is null.
            pub fn is_null(&self) -> bool {
                self.ptr.is_none()
            }

            /// Returns the number of elements in the array view.
            pub fn len(&self) -> usize {
                if self.is_null() { 0 } else { self.shape.len() }
            }

            /// Returns a raw pointer to the first element, or null for a null view.
            pub fn as_ptr(&self) -> *const T {
                self.ptr.map_or(std::ptr::null(), |ptr| ptr.as_ptr() as *const T)
            }

            /// Returns the array rank, i.e. the number of dimensions.
            pub fn rank(&self) -> usize {
                S::RANK
            }

            /// Returns the array shape.
            pub fn shape(&self) -> S {
                self.shape
            }

            /// Returns the number of elements in the outermost dimension, or zero
            /// for a null view.
            pub fn size(&self) -> usize {
                if self.is_null() { 0 } else { self.shape.size() }
            }

            /// Returns the distance between elements in the outermost dimension.
            pub fn stride(&self) -> usize {
                self.shape.stride()
            }

            /// Returns a reference to the element at the given multidimensional index.
            ///
            /// # Panics
            ///
            /// Panics if the view is null, or if the index is out of bounds.
            #[track_caller]
            pub fn get(&self, index: &[usize]) -> &T {
                check::checked(concat!($name, "::get"), self.try_get(index))
            }

            /// Returns a reference to the element at the given multidimensional index,
            /// or an error if the view is null or the index is out of bounds.
            pub fn try_get(&self, index: &[usize]) -> Result<&T, ViewError> {
                let offset = self.try_offset(index)?;

                unsafe { Ok(&*self.as_ptr().add(offset)) }
            }

            /// Returns an iterator over the outermost dimension.
            pub fn iter(&self) -> AxisIter<'_, T, S> {
                AxisIter::new(self.as_view())
            }

            /// Returns a slice of all elements in the array view.
            pub fn as_flat(&self) -> &[T] {
                match self.ptr {
                    Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.shape.len()) },
                    None => &[],
                }
            }

            pub(crate) unsafe fn from_parts(ptr: Option<NonNull<T>>, shape: S) -> Self {
                Self { ptr, shape, phantom: PhantomData }
            }

            pub(crate) fn raw_parts(&self) -> (Option<NonNull<T>>, S) {
                (self.ptr, self.shape)
            }

            fn try_offset(&self, index: &[usize]) -> Result<usize, ViewError> {
                if self.is_null() {
                    return Err(ViewError::NullView);
                }

                self.shape.offset(index)
            }

            fn try_outer(&self, index: usize) -> Result<NonNull<T>, ViewError> {
                let ptr = self.ptr.ok_or(ViewError::NullView)?;
                let size = self.shape.size();

                if index >= size {
                    return Err(ViewError::IndexOutOfBounds { dim: 0, index, size });
                }

                unsafe { Ok(ptr.add(self.shape.stride() * index)) }
            }
        }

        impl<'a, T, S: Shape> Default for $view<'a, T, S> {
            fn default() -> Self {
                Self::null()
            }
        }

        impl<'a, T, S: Shape, const N: usize> Index<[usize; N]> for $view<'a, T, S> {
            type Output = T;

            #[track_caller]
            fn index(&self, index: [usize; N]) -> &T {
                const { assert!(N == S::RANK, "invalid rank") };

                check::checked(concat!($name, "::index"), self.try_get(&index))
            }
        }

        impl<'a, T, X: Dim> Index<usize> for $view<'a, T, (X,)> {
            type Output = T;

            #[track_caller]
            fn index(&self, index: usize) -> &T {
                match self.try_outer(index) {
                    Ok(ptr) => unsafe { &*ptr.as_ptr() },
                    Err(error) => check::violation(concat!($name, "::index"), error),
                }
            }
        }
    };
}

impl_view!("View", View, const, {});
impl_view!("ViewMut", ViewMut, mut, {mut});

impl<'a, T, S: Shape> View<'a, T, S> {
    /// Returns the array view for the given index in the outermost dimension,
    /// or a reference to the element for a one-dimensional view.
    ///
    /// # Panics
    ///
    /// Panics if the view is null, or if the index is out of bounds.
    #[track_caller]
    pub fn at(&self, index: usize) -> S::Item<'a, T> {
        check::checked("View::at", self.try_at(index))
    }

    /// Returns the array view for the given index in the outermost dimension,
    /// or an error if the view is null or the index is out of bounds.
    pub fn try_at(&self, index: usize) -> Result<S::Item<'a, T>, ViewError> {
        let ptr = self.try_outer(index)?;

        unsafe { Ok(S::item(ptr, self.shape.tail())) }
    }

    /// Returns the array view as the same shape, except that constant-sized and
    /// deferred dimensions may be exchanged.
    ///
    /// # Panics
    ///
    /// Panics if a constant-sized dimension is not matching the current size.
    #[track_caller]
    pub fn convert<R: Shape>(self) -> View<'a, T, R> {
        check::checked("View::convert", self.try_convert())
    }

    /// Returns the array view with a compatible shape, or an error if a
    /// constant-sized dimension is not matching the current size.
    pub fn try_convert<R: Shape>(self) -> Result<View<'a, T, R>, ViewError> {
        let shape = match self.ptr {
            Some(_) => R::convert_from(&self.shape)?,
            None => R::default(),
        };

        unsafe { Ok(View::from_parts(self.ptr, shape)) }
    }

    /// Converts the array view into a slice of all elements.
    pub fn into_flat(self) -> &'a [T] {
        match self.ptr {
            Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.shape.len()) },
            None => &[],
        }
    }

    /// Returns a copy of the array view.
    pub fn as_view(&self) -> View<'a, T, S> {
        *self
    }

    pub(crate) unsafe fn at_unchecked(&self, index: usize) -> S::Item<'a, T> {
        debug_assert!(index < self.size(), "index out of bounds");

        unsafe {
            let ptr = self.ptr.unwrap_unchecked().add(self.shape.stride() * index);

            S::item(ptr, self.shape.tail())
        }
    }
}

impl<'a, T, X: Dim> View<'a, T, (X,)> {
    /// Returns a slice of the elements in the one-dimensional array view.
    pub fn as_slice(&self) -> &'a [T] {
        self.into_flat()
    }
}

impl<'a, T, S: Shape> ViewMut<'a, T, S> {
    /// Returns the array view for the given index in the outermost dimension,
    /// or a reference to the element for a one-dimensional view.
    ///
    /// # Panics
    ///
    /// Panics if the view is null, or if the index is out of bounds.
    #[track_caller]
    pub fn at(&self, index: usize) -> S::Item<'_, T> {
        check::checked("ViewMut::at", self.try_at(index))
    }

    /// Returns the array view for the given index in the outermost dimension,
    /// or an error if the view is null or the index is out of bounds.
    pub fn try_at(&self, index: usize) -> Result<S::Item<'_, T>, ViewError> {
        let ptr = self.try_outer(index)?;

        unsafe { Ok(S::item(ptr, self.shape.tail())) }
    }

    /// Returns the mutable array view for the given index in the outermost
    /// dimension, or a mutable reference to the element for a one-dimensional view.
    ///
    /// # Panics
    ///
    /// Panics if the view is null, or if the index is out of bounds.
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> S::ItemMut<'_, T> {
        check::checked("ViewMut::at_mut", self.try_at_mut(index))
    }

    /// Returns the mutable array view for the given index in the outermost
    /// dimension, or an error if the view is null or the index is out of bounds.
    pub fn try_at_mut(&mut self, index: usize) -> Result<S::ItemMut<'_, T>, ViewError> {
        let ptr = self.try_outer(index)?;

        unsafe { Ok(S::item_mut(ptr, self.shape.tail())) }
    }

    /// Converts the array view into the mutable array view for the given index
    /// in the outermost dimension.
    ///
    /// # Panics
    ///
    /// Panics if the view is null, or if the index is out of bounds.
    #[track_caller]
    pub fn into_at(self, index: usize) -> S::ItemMut<'a, T> {
        match self.try_outer(index) {
            Ok(ptr) => unsafe { S::item_mut(ptr, self.shape.tail()) },
            Err(error) => check::violation("ViewMut::into_at", error),
        }
    }

    /// Returns a mutable reference to the element at the given multidimensional index.
    ///
    /// # Panics
    ///
    /// Panics if the view is null, or if the index is out of bounds.
    #[track_caller]
    pub fn get_mut(&mut self, index: &[usize]) -> &mut T {
        check::checked("ViewMut::get_mut", self.try_get_mut(index))
    }

    /// Returns a mutable reference to the element at the given multidimensional
    /// index, or an error if the view is null or the index is out of bounds.
    pub fn try_get_mut(&mut self, index: &[usize]) -> Result<&mut T, ViewError> {
        let offset = self.try_offset(index)?;

        unsafe { Ok(&mut *self.as_mut_ptr().add(offset)) }
    }

    /// Returns a mutable raw pointer to the first element, or null for a null view.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Returns a mutable slice of all elements in the array view.
    pub fn as_flat_mut(&mut self) -> &mut [T] {
        self.reborrow().into_flat_mut()
    }

    /// Converts the array view into a mutable slice of all elements.
    pub fn into_flat_mut(self) -> &'a mut [T] {
        match self.ptr {
            Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.shape.len()) },
            None => &mut [],
        }
    }

    /// Returns an array view of the elements.
    pub fn as_view(&self) -> View<'_, T, S> {
        unsafe { View::from_parts(self.ptr, self.shape) }
    }

    /// Converts the mutable array view into an array view with the same lifetime.
    pub fn into_view(self) -> View<'a, T, S> {
        unsafe { View::from_parts(self.ptr, self.shape) }
    }

    /// Returns a mutable array view with a shorter lifetime.
    pub fn reborrow(&mut self) -> ViewMut<'_, T, S> {
        unsafe { ViewMut::from_parts(self.ptr, self.shape) }
    }

    /// Returns a mutable iterator over the outermost dimension.
    pub fn iter_mut(&mut self) -> AxisIterMut<'_, T, S> {
        AxisIterMut::new(self.reborrow())
    }

    /// Returns the mutable array view as the same shape, except that constant-sized
    /// and deferred dimensions may be exchanged.
    ///
    /// # Panics
    ///
    /// Panics if a constant-sized dimension is not matching the current size.
    #[track_caller]
    pub fn convert<R: Shape>(self) -> ViewMut<'a, T, R> {
        check::checked("ViewMut::convert", self.try_convert())
    }

    /// Returns the mutable array view with a compatible shape, or an error if a
    /// constant-sized dimension is not matching the current size.
    pub fn try_convert<R: Shape>(self) -> Result<ViewMut<'a, T, R>, ViewError> {
        let shape = match self.ptr {
            Some(_) => R::convert_from(&self.shape)?,
            None => R::default(),
        };

        unsafe { Ok(ViewMut::from_parts(self.ptr, shape)) }
    }

    pub(crate) unsafe fn at_mut_unchecked(&self, index: usize) -> S::ItemMut<'a, T> {
        debug_assert!(index < self.size(), "index out of bounds");

        unsafe {
            let ptr = self.ptr.unwrap_unchecked().add(self.shape.stride() * index);

            S::item_mut(ptr, self.shape.tail())
        }
    }
}

impl<'a, T, X: Dim> ViewMut<'a, T, (X,)> {
    /// Returns a slice of the elements in the one-dimensional array view.
    pub fn as_slice(&self) -> &[T] {
        self.as_flat()
    }

    /// Returns a mutable slice of the elements in the one-dimensional array view.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.as_flat_mut()
    }
}

impl<'a, T, S: Shape, const N: usize> IndexMut<[usize; N]> for ViewMut<'a, T, S> {
    #[track_caller]
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        const { assert!(N == S::RANK, "invalid rank") };

        check::checked("ViewMut::index_mut", self.try_get_mut(&index))
    }
}

impl<'a, T, X: Dim> IndexMut<usize> for ViewMut<'a, T, (X,)> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.try_outer(index) {
            Ok(ptr) => unsafe { &mut *ptr.as_ptr() },
            Err(error) => check::violation("ViewMut::index_mut", error),
        }
    }
}

impl<'a, T, S: Shape> Clone for View<'a, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, S: Shape> Copy for View<'a, T, S> {}

impl<'a, T, S: Shape> From<ViewMut<'a, T, S>> for View<'a, T, S> {
    fn from(view: ViewMut<'a, T, S>) -> Self {
        view.into_view()
    }
}

impl<'a, T, S: Shape> IntoIterator for View<'a, T, S> {
    type Item = S::Item<'a, T>;
    type IntoIter = AxisIter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        AxisIter::new(self)
    }
}

impl<'a, 'b, T, S: Shape> IntoIterator for &'b View<'a, T, S> {
    type Item = S::Item<'a, T>;
    type IntoIter = AxisIter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        AxisIter::new(*self)
    }
}

impl<'a, T, S: Shape> IntoIterator for ViewMut<'a, T, S> {
    type Item = S::ItemMut<'a, T>;
    type IntoIter = AxisIterMut<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        AxisIterMut::new(self)
    }
}

impl<'a, 'b, T, S: Shape> IntoIterator for &'b ViewMut<'a, T, S> {
    type Item = S::Item<'b, T>;
    type IntoIter = AxisIter<'b, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, 'b, T, S: Shape> IntoIterator for &'b mut ViewMut<'a, T, S> {
    type Item = S::ItemMut<'b, T>;
    type IntoIter = AxisIterMut<'b, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

unsafe impl<'a, T: Sync, S: Shape> Send for View<'a, T, S> {}
unsafe impl<'a, T: Sync, S: Shape> Sync for View<'a, T, S> {}

unsafe impl<'a, T: Send, S: Shape> Send for ViewMut<'a, T, S> {}
unsafe impl<'a, T: Sync, S: Shape> Sync for ViewMut<'a, T, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dim::{Const, Dyn};

    #[test]
    fn test_at() {
        let data: Vec<usize> = (0..24).collect();
        let view = View::new(&data, (Const::<2>, Dyn(3), Const::<4>));

        assert_eq!(view.size(), 2);
        assert_eq!(view.stride(), 12);
        assert_eq!(view.at(1).size(), 3);
        assert_eq!(view.at(1).stride(), 4);
        assert_eq!(*view.at(1).at(2).at(3), 23);
        assert_eq!(view.at(1).at(0).as_slice(), &[12, 13, 14, 15]);

        assert_eq!(
            view.try_at(2).unwrap_err(),
            ViewError::IndexOutOfBounds { dim: 0, index: 2, size: 2 }
        );
    }

    #[test]
    fn test_null() {
        let view = View::<i32, (Dyn, Const<4>)>::null();

        assert!(view.is_null());
        assert!(view.is_empty());
        assert_eq!(view.size(), 0);
        assert_eq!(view.dim(1), 0);
        assert_eq!(view.as_ptr(), std::ptr::null());
        assert_eq!(view.as_flat(), &[] as &[i32]);
        assert_eq!(view.try_at(0).unwrap_err(), ViewError::NullView);
        assert_eq!(view.try_dim(2), Err(ViewError::DimOutOfRange { dim: 2, rank: 2 }));
    }

    #[test]
    fn test_raw_parts() {
        let mut data = [1, 2, 3, 4, 5, 6];
        let mut view = unsafe { ViewMut::from_raw_parts(data.as_mut_ptr(), (Dyn(2), Dyn(3))) };

        *view.at_mut(1).at_mut(0) = 40;
        view[[0, 2]] = 30;

        assert_eq!(view.as_flat(), &[1, 2, 30, 40, 5, 6]);

        let null = unsafe { View::<i32, (Dyn,)>::from_raw_parts(std::ptr::null(), (Dyn(3),)) };

        assert!(null.is_null());
        assert_eq!(null.size(), 0);
    }

    #[test]
    fn test_buffer_size() {
        let data = [0u8; 5];

        assert_eq!(
            View::try_new(&data, (Dyn(2), Dyn(3))).unwrap_err(),
            ViewError::BufferTooSmall { len: 5, required: 6 }
        );
        assert_eq!(View::try_new(&data, (Dyn(2), Dyn(2))).unwrap().len(), 4);

        let empty: [u8; 0] = [];

        assert_eq!(
            View::try_new(&empty, (Dyn(1 << 33), Dyn(1 << 31))).unwrap_err(),
            ViewError::ShapeOverflow
        );
        assert_eq!(
            ViewMut::try_new(&mut [0u8; 4], (Dyn(usize::MAX), Dyn(2))).unwrap_err(),
            ViewError::ShapeOverflow
        );
    }
}
