//! Macros for error handling.
//!
//! Provides convenience macros for creating and returning [`crate::error::NutriError`]
//! instances with reduced boilerplate.

/// Creates a [`crate::error::NutriError`] from error kind and description.
///
/// Supports an optional dynamic detail, rendered with [`ToString`], and an optional source
/// error following the detail.
#[macro_export]
macro_rules! nutri_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::NutriError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::NutriError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::NutriError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Creates and returns a [`crate::error::NutriError`] from the current function.
///
/// Supports the same optional detail as [`nutri_error!`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::nutri_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::nutri_error!($kind, $desc, $detail))
    };
}
