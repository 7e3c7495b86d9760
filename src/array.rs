//! Conversion from nested arrays into array views.
//!
//! An array view can be created from a reference to a nested array such as
//! `[[T; 4]; 3]`, where the nesting depth is the rank. Constant-sized dimensions
//! must match the array lengths and deferred dimensions take them, which is
//! checked at compile time:
//!
//! ```
//! use mdview::{Const, Dyn, View};
//!
//! let a = [[1, 2, 3], [4, 5, 6]];
//!
//! let v = View::<_, (Dyn, Const<3>)>::from(&a);
//!
//! assert_eq!(v.shape(), (Dyn(2), Const));
//! assert_eq!(v[[1, 2]], 6);
//! ```
//!
//! ```compile_fail
//! use mdview::{Const, Dyn, View};
//!
//! let a = [[1, 2, 3], [4, 5, 6]];
//!
//! let v = View::<_, (Dyn, Const<4>)>::from(&a);
//! ```

use crate::check;
use crate::dim::{fits, Dim};
use crate::shape::Extents;
use crate::view::{View, ViewMut};

macro_rules! impl_from_array {
    (($($xyz:tt),+), ($($abc:tt),+), $array:ty, ($($flat:tt),*), ($($flat_mut:tt),*)) => {
        impl<'a, T, $($xyz: Dim,)+ $(const $abc: usize,)+> From<&'a $array>
            for View<'a, T, ($($xyz,)+)>
        {
            #[track_caller]
            fn from(array: &'a $array) -> Self {
                const { assert!(true $(&& fits($xyz::SIZE, $abc))+, "dimension mismatch") };

                let shape = check::checked(
                    "View::from",
                    <($($xyz,)+) as Extents>::from_dims(&[$($abc),+]),
                );

                Self::new(array$(.$flat())*, shape)
            }
        }

        impl<'a, T, $($xyz: Dim,)+ $(const $abc: usize,)+> From<&'a mut $array>
            for ViewMut<'a, T, ($($xyz,)+)>
        {
            #[track_caller]
            fn from(array: &'a mut $array) -> Self {
                const { assert!(true $(&& fits($xyz::SIZE, $abc))+, "dimension mismatch") };

                let shape = check::checked(
                    "ViewMut::from",
                    <($($xyz,)+) as Extents>::from_dims(&[$($abc),+]),
                );

                Self::new(array$(.$flat_mut())*, shape)
            }
        }
    };
}

impl_from_array!((X), (A), [T; A], (as_slice), (as_mut_slice));
impl_from_array!((X, Y), (A, B), [[T; B]; A], (as_flattened), (as_flattened_mut));
impl_from_array!(
    (X, Y, Z),
    (A, B, C),
    [[[T; C]; B]; A],
    (as_flattened, as_flattened),
    (as_flattened_mut, as_flattened_mut)
);
impl_from_array!(
    (X, Y, Z, W),
    (A, B, C, D),
    [[[[T; D]; C]; B]; A],
    (as_flattened, as_flattened, as_flattened),
    (as_flattened_mut, as_flattened_mut, as_flattened_mut)
);
impl_from_array!(
    (X, Y, Z, W, U),
    (A, B, C, D, E),
    [[[[[T; E]; D]; C]; B]; A],
    (as_flattened, as_flattened, as_flattened, as_flattened),
    (as_flattened_mut, as_flattened_mut, as_flattened_mut, as_flattened_mut)
);
impl_from_array!(
    (X, Y, Z, W, U, V),
    (A, B, C, D, E, F),
    [[[[[[T; F]; E]; D]; C]; B]; A],
    (as_flattened, as_flattened, as_flattened, as_flattened, as_flattened),
    (as_flattened_mut, as_flattened_mut, as_flattened_mut, as_flattened_mut, as_flattened_mut)
);
