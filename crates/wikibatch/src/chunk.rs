use core::slice;

/// Splits `items` into consecutive, non-overlapping slices of `size`.
///
/// The last slice may be shorter. When `size` is `None` or `Some(0)` exactly
/// one chunk is produced and it is the whole input, including when the input
/// is empty.
///
/// ```
/// use wikibatch::chunks;
///
/// let ids = ["Q1", "Q2", "Q3"];
/// let split: Vec<_> = chunks(&ids, Some(2)).collect();
/// assert_eq!(split, vec![&ids[..2], &ids[2..]]);
///
/// let whole: Vec<_> = chunks(&ids, None).collect();
/// assert_eq!(whole, vec![&ids[..]]);
/// ```
pub fn chunks<T>(items: &[T], size: Option<usize>) -> Chunks<'_, T> {
    match size {
        Some(size) if size > 0 => Chunks::Sized(items.chunks(size)),
        _ => Chunks::Whole(Some(items)),
    }
}

/// Iterator returned by [`chunks`].
#[derive(Debug, Clone)]
pub enum Chunks<'a, T> {
    Sized(slice::Chunks<'a, T>),
    Whole(Option<&'a [T]>),
}

impl<'a, T> Iterator for Chunks<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Sized(inner) => inner.next(),
            Self::Whole(whole) => whole.take(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Sized(inner) => inner.size_hint(),
            Self::Whole(whole) => {
                let n = usize::from(whole.is_some());
                (n, Some(n))
            }
        }
    }
}

impl<T> ExactSizeIterator for Chunks<'_, T> {}
