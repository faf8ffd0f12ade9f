//! Abstract operations understood by storage [`Handler`]s.

use std::marker::PhantomData;

#[cfg(doc)]
use crate::Handler;

/// Operation to insert a value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation to delete a value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation to select a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation to open a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Value a [`Handler`] resolves into once [`Transact`]ed.
pub type Transacted<T> = <T as crate::Handler<Transact>>::Ok;

/// Operation to commit an opened transaction.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B`y value.
///
/// `By<W, ()>` selects every `W` there is.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the value to select.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector out of the provided value.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the value this [`By`] selects by.
    #[must_use]
    pub fn get(&self) -> &B {
        &self.by
    }

    /// Consumes this [`By`] and returns the value it selects by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
