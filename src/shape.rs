use std::fmt::Debug;
use std::hash::Hash;
use std::ptr::NonNull;

use crate::check::ViewError;
use crate::dim::{Dim, Dyn};
use crate::view::{View, ViewMut};

/// Array extents trait, for the size and stride of each dimension.
///
/// Implemented for tuples of dimensions ordered from the outermost, with the
/// empty tuple for a scalar. Strides are derived from the extents in
/// row-major order, so the outermost dimension has the largest stride.
pub trait Extents: Copy + Debug + Default + Eq + Hash + Send + Sync {
    /// Extents excluding the outermost dimension.
    type Tail: Extents;

    /// Number of dimensions.
    const RANK: usize;

    /// Number of dimensions with deferred size.
    const DEFERRED: usize;

    /// Returns the number of elements in the outermost dimension, or 1 for a scalar.
    fn size(&self) -> usize;

    /// Returns the extents excluding the outermost dimension.
    fn tail(&self) -> Self::Tail;

    /// Returns the distance between elements in the outermost dimension.
    fn stride(&self) -> usize {
        if Self::RANK == 0 {
            1
        } else {
            let tail = self.tail();

            tail.size() * tail.stride()
        }
    }

    /// Returns the number of elements in the specified dimension, counted from
    /// the outermost. Dimensions beyond the rank have size 1.
    fn dim(&self, index: usize) -> usize {
        if Self::RANK == 0 || index == 0 {
            self.size()
        } else {
            self.tail().dim(index - 1)
        }
    }

    /// Returns the number of elements in total.
    fn len(&self) -> usize {
        self.size() * self.stride()
    }

    /// Returns `true` if there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements in total, or `None` if it overflows.
    ///
    /// The product is formed from the innermost dimension outwards, so that
    /// every stride is covered by the same check.
    fn checked_len(&self) -> Option<usize> {
        if Self::RANK == 0 {
            Some(1)
        } else {
            self.tail().checked_len()?.checked_mul(self.size())
        }
    }

    /// Creates extents with the given sizes for the deferred dimensions,
    /// ordered from the outermost. Constant-sized dimensions take no size.
    fn from_deferred(sizes: &[usize]) -> Result<Self, ViewError> {
        if sizes.len() != Self::DEFERRED {
            return Err(ViewError::DeferredCount { expected: Self::DEFERRED, found: sizes.len() });
        }

        let mut deferred = sizes.iter().copied();

        Self::try_from_fn(
            &mut |_, size| match size {
                Some(size) => Ok(size),
                None => deferred.next().ok_or(ViewError::DeferredCount {
                    expected: Self::DEFERRED,
                    found: sizes.len(),
                }),
            },
            0,
        )
    }

    /// Creates extents with the given sizes for all dimensions.
    fn from_dims(dims: &[usize]) -> Result<Self, ViewError> {
        if dims.len() != Self::RANK {
            return Err(ViewError::RankMismatch { rank: Self::RANK, found: dims.len() });
        }

        Self::try_from_fn(&mut |i, _| Ok(dims[i]), 0)
    }

    /// Creates extents from other extents with the same rank, where constant-sized
    /// dimensions must match and deferred dimensions take the other size.
    fn convert_from<E: Extents>(other: &E) -> Result<Self, ViewError> {
        const { assert!(E::RANK == Self::RANK, "rank mismatch") };

        Self::try_from_fn(&mut |i, _| Ok(other.dim(i)), 0)
    }

    /// Checks that deferred sizes are non-zero, constant sizes are matching
    /// and the number of elements fits in `usize`.
    fn validate(&self) -> Result<(), ViewError> {
        _ = Self::try_from_fn(&mut |i, _| Ok(self.dim(i)), 0)?;

        self.checked_len().map(|_| ()).ok_or(ViewError::ShapeOverflow)
    }

    /// Returns the offset of the element at the given index.
    fn offset(&self, index: &[usize]) -> Result<usize, ViewError> {
        if index.len() != Self::RANK {
            return Err(ViewError::RankMismatch { rank: Self::RANK, found: index.len() });
        }

        let mut offset = 0;
        let mut stride = 1;

        for dim in (0..Self::RANK).rev() {
            let size = self.dim(dim);

            if index[dim] >= size {
                return Err(ViewError::IndexOutOfBounds { dim, index: index[dim], size });
            }

            offset += stride * index[dim];
            stride *= size;
        }

        Ok(offset)
    }

    #[doc(hidden)]
    fn try_from_fn<F>(f: &mut F, depth: usize) -> Result<Self, ViewError>
    where
        F: FnMut(usize, Option<usize>) -> Result<usize, ViewError>;
}

/// Array shape trait, for extents with at least one dimension.
pub trait Shape: Extents {
    /// Outermost dimension.
    type Head: Dim;

    /// Result of indexing the outermost dimension of a view.
    type Item<'a, T: 'a>;

    /// Result of indexing the outermost dimension of a mutable view.
    type ItemMut<'a, T: 'a>;

    /// Returns the outermost dimension.
    fn head(&self) -> Self::Head;

    #[doc(hidden)]
    unsafe fn item<'a, T: 'a>(ptr: NonNull<T>, tail: Self::Tail) -> Self::Item<'a, T>;

    #[doc(hidden)]
    unsafe fn item_mut<'a, T: 'a>(ptr: NonNull<T>, tail: Self::Tail) -> Self::ItemMut<'a, T>;
}

/// Conversion trait into an array shape.
pub trait IntoShape {
    /// Which kind of array shape are we turning this into?
    type IntoShape: Shape;

    /// Creates array shape from a value.
    fn into_shape(self) -> Self::IntoShape;
}

/// Array shape type with deferred-sized dimensions.
pub type Rank<const N: usize> = <[usize; N] as IntoShape>::IntoShape;

fn resolve<D: Dim>(size: usize, dim: usize) -> Result<D, ViewError> {
    D::try_from_size(size).ok_or(match D::SIZE {
        Some(expected) => ViewError::ExtentMismatch { dim, expected, found: size },
        None => ViewError::ZeroExtent { dim },
    })
}

impl Extents for () {
    type Tail = ();

    const RANK: usize = 0;
    const DEFERRED: usize = 0;

    fn size(&self) -> usize {
        1
    }

    fn tail(&self) {}

    fn try_from_fn<F>(_: &mut F, _: usize) -> Result<Self, ViewError>
    where
        F: FnMut(usize, Option<usize>) -> Result<usize, ViewError>,
    {
        Ok(())
    }
}

impl<X: Dim> Extents for (X,) {
    type Tail = ();

    const RANK: usize = 1;
    const DEFERRED: usize = X::SIZE.is_none() as usize;

    fn size(&self) -> usize {
        self.0.size()
    }

    fn tail(&self) {}

    fn try_from_fn<F>(f: &mut F, depth: usize) -> Result<Self, ViewError>
    where
        F: FnMut(usize, Option<usize>) -> Result<usize, ViewError>,
    {
        Ok((resolve(f(depth, X::SIZE)?, depth)?,))
    }
}

impl<X: Dim> Shape for (X,) {
    type Head = X;

    type Item<'a, T: 'a> = &'a T;
    type ItemMut<'a, T: 'a> = &'a mut T;

    fn head(&self) -> X {
        self.0
    }

    unsafe fn item<'a, T: 'a>(ptr: NonNull<T>, _: ()) -> &'a T {
        unsafe { &*ptr.as_ptr() }
    }

    unsafe fn item_mut<'a, T: 'a>(ptr: NonNull<T>, _: ()) -> &'a mut T {
        unsafe { &mut *ptr.as_ptr() }
    }
}

macro_rules! impl_shape {
    ($n:tt, ($($jk:tt),+), ($($ij:tt),+), ($($yz:tt),+)) => {
        impl<X: Dim, $($yz: Dim,)+> Extents for (X, $($yz,)+) {
            type Tail = ($($yz,)+);

            const RANK: usize = $n;
            const DEFERRED: usize = X::SIZE.is_none() as usize + <Self::Tail as Extents>::DEFERRED;

            fn size(&self) -> usize {
                self.0.size()
            }

            fn tail(&self) -> Self::Tail {
                ($(self.$jk,)+)
            }

            fn try_from_fn<F>(f: &mut F, depth: usize) -> Result<Self, ViewError>
            where
                F: FnMut(usize, Option<usize>) -> Result<usize, ViewError>,
            {
                let head = resolve(f(depth, X::SIZE)?, depth)?;
                let tail = <Self::Tail as Extents>::try_from_fn(f, depth + 1)?;

                Ok((head, $(tail.$ij,)+))
            }
        }

        impl<X: Dim, $($yz: Dim,)+> Shape for (X, $($yz,)+) {
            type Head = X;

            type Item<'a, T: 'a> = View<'a, T, ($($yz,)+)>;
            type ItemMut<'a, T: 'a> = ViewMut<'a, T, ($($yz,)+)>;

            fn head(&self) -> X {
                self.0
            }

            unsafe fn item<'a, T: 'a>(ptr: NonNull<T>, tail: Self::Tail) -> Self::Item<'a, T> {
                unsafe { View::from_parts(Some(ptr), tail) }
            }

            unsafe fn item_mut<'a, T: 'a>(ptr: NonNull<T>, tail: Self::Tail) -> Self::ItemMut<'a, T> {
                unsafe { ViewMut::from_parts(Some(ptr), tail) }
            }
        }
    };
}

impl_shape!(2, (1), (0), (Y));
impl_shape!(3, (1, 2), (0, 1), (Y, Z));
impl_shape!(4, (1, 2, 3), (0, 1, 2), (Y, Z, W));
impl_shape!(5, (1, 2, 3, 4), (0, 1, 2, 3), (Y, Z, W, U));
impl_shape!(6, (1, 2, 3, 4, 5), (0, 1, 2, 3, 4), (Y, Z, W, U, V));

impl<S: Shape> IntoShape for S {
    type IntoShape = S;

    fn into_shape(self) -> S {
        self
    }
}

macro_rules! impl_into_shape {
    ($n:tt, $shape:ty, ($($ij:tt),+)) => {
        impl IntoShape for [usize; $n] {
            type IntoShape = $shape;

            fn into_shape(self) -> Self::IntoShape {
                ($(Dyn(self[$ij]),)+)
            }
        }
    };
}

impl_into_shape!(1, (Dyn,), (0));
impl_into_shape!(2, (Dyn, Dyn), (0, 1));
impl_into_shape!(3, (Dyn, Dyn, Dyn), (0, 1, 2));
impl_into_shape!(4, (Dyn, Dyn, Dyn, Dyn), (0, 1, 2, 3));
impl_into_shape!(5, (Dyn, Dyn, Dyn, Dyn, Dyn), (0, 1, 2, 3, 4));
impl_into_shape!(6, (Dyn, Dyn, Dyn, Dyn, Dyn, Dyn), (0, 1, 2, 3, 4, 5));
