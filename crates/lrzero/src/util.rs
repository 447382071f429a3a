use std::fmt;

/// Adapts a formatting closure into a `Display` value.
///
/// Several types in this crate can only be rendered together with the grammar
/// that owns their symbols; their `display(&grammar)` methods return one of
/// these instead of implementing `Display` directly.
pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct DisplayFn<F>(F);

    impl<F> fmt::Display for DisplayFn<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.0)(formatter)
        }
    }

    DisplayFn(f)
}
