/// Projects a stored value onto the key it is ordered by.
pub(crate) trait KeyExtract<V> {
    type Key;

    fn key(value: &V) -> &Self::Key;
}

/// Sets are ordered by the whole value.
pub(crate) struct Identity;

impl<T> KeyExtract<T> for Identity {
    type Key = T;

    #[inline]
    fn key(value: &T) -> &T {
        value
    }
}

/// Maps are ordered by the first component of each `(key, value)` entry.
pub(crate) struct First;

impl<K, V> KeyExtract<(K, V)> for First {
    type Key = K;

    #[inline]
    fn key(entry: &(K, V)) -> &K {
        &entry.0
    }
}
