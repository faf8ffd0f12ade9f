//! Abstractions for offset pagination.

/// Offset pagination arguments.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// Zero-based number of the requested page.
    page: usize,

    /// Number of items per page.
    per_page: usize,
}

impl Arguments {
    /// Creates new [`Arguments`] for the provided `page` of `per_page` items.
    ///
    /// [`None`] is returned if `page` is negative, `per_page` is not
    /// positive, or the resulting offset overflows.
    pub fn new<Num>(page: Num, per_page: Num) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        let page: usize = page.try_into().ok()?;
        let per_page: usize =
            per_page.try_into().ok().filter(|n: &usize| *n > 0)?;
        _ = page.checked_mul(per_page)?;
        Some(Self { page, per_page })
    }

    /// Returns zero-based number of the page requested by these
    /// [`Arguments`].
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Returns maximum number of items to return.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.per_page
    }

    /// Returns number of items to skip before the requested page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page * self.per_page
    }
}

/// A page of items selected by [`Arguments`].
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] from the provided items.
    #[must_use]
    pub fn new(arguments: Arguments, items: impl IntoIterator<Item = I>) -> Self {
        Self {
            items: items.into_iter().collect(),
            arguments,
        }
    }
}
