/*!
# Multidimensional array views for Rust

## Overview

The mdview crate provides multidimensional views into flat, contiguous
buffers. A view does not own or allocate the elements, but addresses an
existing buffer such as an array, a vector or mapped memory as nested rows,
columns and planes.

Here are the main features of mdview:

- The rank is known at compile time, up to six dimensions.
- Each dimension is either constant-sized with `Const<N>`, or sized at
  construction with `Dyn`. Constant-sized dimensions have no runtime overhead.
- Row-major element order, where strides are derived from the sizes.
- Indexing the outermost dimension gives a view with one dimension less,
  and iteration gives the views for each index.
- Views can be created from nested arrays, with the sizes checked at compile time.

## Shape

The shape of a view is a tuple of dimensions ordered from the outermost, for
example `(Dyn, Const<4>)` for a matrix with a deferred number of rows and four
columns. The deferred sizes are given at construction:

```
use mdview::{Const, Dyn, View};

let buf: Vec<i32> = (0..16).collect();

let a = View::new(&buf, (Dyn(4), Const::<4>));
let b = View::<_, (Dyn, Const<4>)>::with_deferred(&buf, &[4]);

assert_eq!(a.at(2)[3], 11);
assert_eq!(b[[2, 3]], 11);
assert_eq!(a.dim(1), 4);
```

## Preconditions

Operations such as indexing have preconditions, for example that the index is
within bounds. A violation is reported to the hook in the [`check`] module and
then panics. Each such operation has a fallible `try_*` variant that returns
a [`ViewError`] instead.

A view can be null, in which case all sizes are zero and indexing is a
precondition violation.
*/

#![warn(unreachable_pub)]
#![warn(unused_results)]

pub mod check;

mod array;
mod dim;
mod format;
mod iter;
mod shape;
mod view;

#[cfg(feature = "serde")]
mod serde;

pub use check::ViewError;
pub use dim::{Const, Dim, Dyn};
pub use iter::{AxisIter, AxisIterMut};
pub use shape::{Extents, IntoShape, Rank, Shape};
pub use view::{View, ViewMut};
