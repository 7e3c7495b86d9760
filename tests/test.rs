use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::thread;

use proptest::prelude::*;

#[cfg(feature = "serde")]
use serde_test::{assert_ser_tokens, Token};

use mdview::{check, Const, Dim, Dyn, Extents, Rank, View, ViewError, ViewMut};

thread_local! {
    static VIOLATIONS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

// Violations are recorded per thread, since tests run in parallel.
fn record_violations() {
    static INIT: Once = Once::new();

    let _ = env_logger::builder().is_test(true).try_init();

    INIT.call_once(|| {
        check::set_hook(Box::new(|violation| {
            VIOLATIONS.with(|v| v.borrow_mut().push(violation.to_string()));
        }));
    });

    VIOLATIONS.with(|v| v.borrow_mut().clear());
}

fn violations() -> Vec<String> {
    VIOLATIONS.with(|v| v.borrow().clone())
}

fn check_2d<X: Dim, Y: Dim>() {
    let mut array = [[0; 4]; 4];

    for y in 0..4 {
        for x in 0..4 {
            array[y][x] = 4 * y + x;
        }
    }

    let empty = View::<usize, (X, Y)>::default();

    assert!(empty.is_null());
    assert_eq!(empty.size(), 0);
    assert_eq!(empty.dim(0), 0);
    assert_eq!(empty.dim(1), 0);
    assert_eq!(empty.iter().count(), 0);

    let view = View::<usize, (X, Y)>::from(&array);

    assert!(!view.is_null());
    assert_eq!(view.size(), 4);
    assert_eq!(view.at(0).size(), 4);
    assert_eq!(view.dim(0), 4);
    assert_eq!(view.dim(1), 4);

    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(*view.at(y).at(x), 4 * y + x);
            assert_eq!(view.at(y)[x], 4 * y + x);
            assert_eq!(view[[y, x]], 4 * y + x);
        }
    }

    let mut idx = 0;

    for row in view {
        for &value in row.as_slice() {
            assert_eq!(value, idx);
            idx += 1;
        }
    }

    assert_eq!(idx, 16);
    assert_eq!(*view.at(2).at(3), 11);
}

#[test]
fn test_2d() {
    check_2d::<Const<4>, Const<4>>();
    check_2d::<Dyn, Const<4>>();
    check_2d::<Const<4>, Dyn>();
    check_2d::<Dyn, Dyn>();
}

#[test]
fn test_base() {
    let buf: Vec<usize> = (0..60).collect();

    let a = View::new(&buf, [3, 4, 5]);
    let b = View::<_, (Const<3>, Dyn, Const<5>)>::with_deferred(&buf, &[4]);

    assert_eq!(a.len(), 60);
    assert_eq!(a.rank(), 3);
    assert_eq!(a.shape(), (Dyn(3), Dyn(4), Dyn(5)));
    assert_eq!(a.stride(), 20);
    assert_eq!(a.at(1).stride(), 5);
    assert_eq!([a.dim(0), a.dim(1), a.dim(2)], [3, 4, 5]);

    assert_eq!(b.shape(), (Const, Dyn(4), Const));
    assert_eq!(b.shape().len(), 60);

    for i in 0..3 {
        for j in 0..4 {
            for k in 0..5 {
                assert_eq!(*a.at(i).at(j).at(k), 20 * i + 5 * j + k);
                assert_eq!(*b.at(i).at(j).at(k), 20 * i + 5 * j + k);
                assert_eq!(a.get(&[i, j, k]), &(20 * i + 5 * j + k));
            }
        }
    }

    assert_eq!(a.at(2).at(1).as_slice(), [45, 46, 47, 48, 49]);
    assert_eq!(a.at(1).as_flat(), (20..40).collect::<Vec<_>>());

    assert_eq!(a.iter().map(|x| x.len()).sum::<usize>(), 60);
    assert_eq!(a.iter().rev().map(|x| *x.at(0).at(0)).collect::<Vec<_>>(), [40, 20, 0]);
    assert_eq!(a.iter().nth(1).map(|x| x[[3, 4]]), Some(39));
}

#[test]
fn test_deferred_outer() {
    let buf: Vec<i32> = (0..16).collect();

    let fixed = View::new(&buf, (Const::<4>, Const::<4>));
    let deferred = View::new(&buf, (Dyn(4), Const::<4>));

    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(fixed[[i, j]], deferred[[i, j]]);
        }
    }

    assert_eq!(deferred.dim(0), fixed.dim(0));
    assert_eq!(deferred.dim(1), fixed.dim(1));
}

#[test]
fn test_convert() {
    let array = [[1, 2, 3], [4, 5, 6]];

    let a = View::<_, (Const<2>, Const<3>)>::from(&array);
    let b = View::<_, (Dyn, Const<3>)>::from(&array);
    let c: View<_, Rank<2>> = a.convert();

    assert_eq!(c.shape(), (Dyn(2), Dyn(3)));
    assert_eq!(b.convert::<(Const<2>, Const<3>)>().shape(), a.shape());
    assert_eq!(c.convert::<(Dyn, Const<3>)>().shape(), b.shape());

    assert_eq!(
        c.try_convert::<(Const<3>, Dyn)>().unwrap_err(),
        ViewError::ExtentMismatch { dim: 0, expected: 3, found: 2 }
    );

    let null = View::<i32, (Dyn, Dyn)>::null().convert::<(Const<2>, Const<3>)>();

    assert!(null.is_null());
    assert_eq!(null.dim(1), 0);
}

#[test]
fn test_mutation() {
    let mut buf = [0; 6];

    {
        let mut a = ViewMut::new(&mut buf, [2, 3]);

        a[[1, 1]] = 7;
        *a.at_mut(0).at_mut(2) = 5;

        for (i, x) in a.at_mut(1).iter_mut().enumerate() {
            *x += 10 * i;
        }

        assert_eq!(a.as_view()[[1, 1]], 17);
        assert_eq!(*a.get_mut(&[0, 2]), 5);

        let row = a.into_at(1);

        assert_eq!(row.as_slice(), [0, 17, 20]);
    }

    let a = View::new(&buf, [2, 3]);
    let b = View::new(&buf, (Const::<6>,));

    assert_eq!(a[[0, 2]], b[2]);
    assert_eq!(a.as_flat(), b.as_slice());
}

#[test]
fn test_threads() {
    let buf: Vec<i64> = (0..12).collect();
    let view = View::new(&buf, (Dyn(3), Const::<4>));

    let sums: Vec<i64> = thread::scope(|s| {
        let handles: Vec<_> =
            view.iter().map(|row| s.spawn(move || row.as_slice().iter().sum::<i64>())).collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sums, [6, 22, 38]);
}

#[test]
fn test_format() {
    let buf = [0, 1, 2, 3, 4, 5];

    assert_eq!(format!("{:?}", View::new(&buf, [2, 3])), "[[0, 1, 2], [3, 4, 5]]");
    assert_eq!(format!("{:?}", View::new(&buf, [3, 1, 2])), "[[[0, 1]], [[2, 3]], [[4, 5]]]");
    assert_eq!(format!("{:?}", View::new(&buf, (Const::<4>,))), "[0, 1, 2, 3]");
    assert_eq!(format!("{:?}", View::<i32, (Dyn, Dyn)>::null()), "[]");
}

#[test]
fn test_violation() {
    record_violations();

    let buf = [1, 2, 3, 4];
    let view = View::new(&buf, [2, 2]);

    let result = panic::catch_unwind(AssertUnwindSafe(|| view.at(2)));

    assert!(result.is_err());
    assert_eq!(violations(), ["View::at: index 2 is out of range for dimension 0 of size 2"]);

    // The view is unchanged after the violation.
    assert_eq!(view[[1, 1]], 4);
    assert_eq!(view.at(1).as_slice(), [3, 4]);

    record_violations();

    let null = View::<i32, (Dyn, Dyn)>::null();

    assert!(panic::catch_unwind(AssertUnwindSafe(|| null.at(0))).is_err());
    assert!(panic::catch_unwind(AssertUnwindSafe(|| view.at(0)[2])).is_err());
    assert!(panic::catch_unwind(AssertUnwindSafe(|| view.dim(2))).is_err());

    assert_eq!(
        violations(),
        [
            "View::at: view is null",
            "View::index: index 2 is out of range for dimension 0 of size 2",
            "View::dim: dimension 2 is out of range for rank 2",
        ]
    );

    record_violations();

    let row = view.at(1);

    assert!(panic::catch_unwind(AssertUnwindSafe(|| row.dim(1))).is_err());
    assert_eq!(violations(), ["View::dim: dimension 1 is out of range for rank 1"]);
    assert_eq!(row.dim(0), 2);
}

#[test]
fn test_iter_violation() {
    record_violations();

    let buf = [1, 2, 3, 4];
    let view = View::new(&buf, [2, 2]);
    let mut iter = view.iter();

    iter.advance(3);

    assert!(panic::catch_unwind(AssertUnwindSafe(|| iter.get(0))).is_err());
    assert_eq!(violations(), ["AxisIter::get: index 3 is out of range for dimension 0 of size 2"]);

    record_violations();

    let iter = view.iter();

    assert!(panic::catch_unwind(AssertUnwindSafe(|| iter.get(-1))).is_err());
    assert_eq!(
        violations(),
        [format!("AxisIter::get: index {} is out of range for dimension 0 of size 2", usize::MAX)]
    );

    // The iterator is not moved by a failed access.
    assert_eq!(iter.position(), 0);
    assert_eq!(iter.get(1).as_slice(), [3, 4]);
}

#[test]
fn test_construction_violation() {
    record_violations();

    let buf = [0; 4];

    assert!(panic::catch_unwind(|| View::new(&buf, [0, 4])).is_err());
    assert!(panic::catch_unwind(|| View::new(&buf, [3, 2])).is_err());
    assert!(panic::catch_unwind(|| View::<_, (Dyn, Dyn)>::with_deferred(&buf, &[4])).is_err());

    assert_eq!(
        violations(),
        [
            "View::new: deferred size of dimension 0 must be greater than 0",
            "View::new: buffer of length 4 is too small for 6 elements",
            "View::with_deferred: expected 2 deferred sizes, got 1",
        ]
    );

    assert_eq!(
        View::<_, (Const<2>, Dyn)>::try_with_deferred(&buf, &[0]).unwrap_err(),
        ViewError::ZeroExtent { dim: 1 }
    );
    assert_eq!(violations().len(), 3);
}

#[test]
#[should_panic(expected = "View::at: index 4 is out of range for dimension 0 of size 4")]
fn test_out_of_bounds() {
    let buf: Vec<i32> = (0..16).collect();
    let view = View::new(&buf, (Dyn(4), Const::<4>));

    _ = view.at(4);
}

#[test]
fn test_try() {
    let buf = [1, 2, 3, 4, 5, 6];
    let view = View::new(&buf, (Const::<2>, Dyn(3)));

    assert_eq!(view.try_at(1).map(|x| x[2]), Ok(6));
    assert_eq!(view.try_dim(1), Ok(3));
    assert_eq!(view.try_get(&[1, 0]), Ok(&4));

    assert_eq!(
        view.try_get(&[0, 3]),
        Err(ViewError::IndexOutOfBounds { dim: 1, index: 3, size: 3 })
    );
    assert_eq!(view.try_get(&[0]), Err(ViewError::RankMismatch { rank: 2, found: 1 }));
    assert_eq!(view.try_dim(2), Err(ViewError::DimOutOfRange { dim: 2, rank: 2 }));
    assert_eq!(View::<i32, Rank<1>>::null().try_at(0), Err(ViewError::NullView));

    let row = View::<_, (Dyn,)>::new(&buf, [4]);

    assert_eq!(row.try_dim(0), Ok(4));
    assert_eq!(row.try_dim(1), Err(ViewError::DimOutOfRange { dim: 1, rank: 1 }));
    assert_eq!(
        View::<i32, (Dyn,)>::null().try_dim(1),
        Err(ViewError::DimOutOfRange { dim: 1, rank: 1 })
    );
}

#[test]
fn test_shape_overflow() {
    let empty: [u8; 0] = [];

    assert_eq!(
        View::try_new(&empty, (Dyn(1 << 33), Dyn(1 << 31))).unwrap_err(),
        ViewError::ShapeOverflow
    );
    assert_eq!(
        View::<u8, (Dyn, Dyn, Dyn)>::try_with_deferred(&empty, &[1 << 22, 1 << 21, 1 << 21])
            .unwrap_err(),
        ViewError::ShapeOverflow
    );
    assert_eq!(
        View::<u8, (Dyn, Dyn)>::try_new(&empty, [usize::MAX, usize::MAX]).unwrap_err(),
        ViewError::ShapeOverflow
    );

    record_violations();

    assert!(panic::catch_unwind(|| View::new(&empty, (Dyn(1 << 33), Dyn(1 << 31)))).is_err());
    assert_eq!(violations(), ["View::new: number of elements overflows usize"]);
}

#[cfg(feature = "serde")]
#[test]
fn test_serde() {
    let buf = [1, 2, 3, 4];

    assert_ser_tokens(
        &View::new(&buf, (Const::<2>, Dyn(2))),
        &[
            Token::Seq { len: Some(2) },
            Token::Seq { len: Some(2) },
            Token::I32(1),
            Token::I32(2),
            Token::SeqEnd,
            Token::Seq { len: Some(2) },
            Token::I32(3),
            Token::I32(4),
            Token::SeqEnd,
            Token::SeqEnd,
        ],
    );

    assert_ser_tokens(
        &View::<i32, Rank<2>>::null(),
        &[Token::Seq { len: Some(0) }, Token::SeqEnd],
    );
}

fn dims_3d() -> impl Strategy<Value = (usize, usize, usize)> {
    (1..6usize, 1..6usize, 1..6usize)
}

proptest! {
    #[test]
    fn test_row_major_index((a, b, c) in dims_3d()) {
        let buf: Vec<usize> = (0..a * b * c).collect();
        let view = View::new(&buf, [a, b, c]);
        let shape = view.shape();

        prop_assert_eq!([view.dim(0), view.dim(1), view.dim(2)], [a, b, c]);
        prop_assert_eq!(shape.stride(), b * c);
        prop_assert_eq!(shape.tail().stride(), c);

        for i in 0..a {
            for j in 0..b {
                for k in 0..c {
                    prop_assert_eq!(*view.at(i).at(j).at(k), i * b * c + j * c + k);
                    prop_assert_eq!(view[[i, j, k]], i * b * c + j * c + k);
                }
            }
        }
    }

    #[test]
    fn test_row_major_iter((a, b, c) in dims_3d()) {
        let buf: Vec<usize> = (0..a * b * c).collect();
        let view = View::new(&buf, [a, b, c]);

        let elems: Vec<usize> = view
            .into_iter()
            .flat_map(|plane| plane.into_iter().flat_map(|row| row.into_iter().copied()))
            .collect();

        prop_assert_eq!(elems, buf);
    }

    #[test]
    fn test_convert_index(a in 1..8usize) {
        let buf: Vec<usize> = (0..4 * a).collect();
        let view = View::new(&buf, [a, 4]);
        let fixed = view.convert::<(Dyn, Const<4>)>();

        prop_assert_eq!(fixed.shape(), (Dyn(a), Const));

        for i in 0..a {
            prop_assert_eq!(fixed.at(i).as_slice(), view.at(i).as_slice());
        }
    }
}
