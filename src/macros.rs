//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! These macros keep call sites short while allowing the option structs to
//! grow new fields without breaking callers.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// ```rust
/// use ci_yaml::options::DuplicateFieldPolicy;
///
/// let options = ci_yaml::options! {
///     duplicate_fields: DuplicateFieldPolicy::LastWins,
///     max_depth: 32,
/// };
/// assert_eq!(options.max_depth, 32);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::Budget`] from `Default` and a list of field assignments.
///
/// ```rust
/// let budget = ci_yaml::budget! {
///     max_depth: 16,
///     max_aliases: 8,
/// };
/// assert_eq!(budget.max_depth, 16);
/// ```
#[macro_export]
macro_rules! budget {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut budget = $crate::Budget::default();
        $(
            budget.$field = $value;
        )*
        budget
    }};
}
