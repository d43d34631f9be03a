//! A small helper macro for declaring open, newtype-style enums.
//!
//! Many binary protocols define a byte (or small integer/array) field whose meaning is an enum,
//! but where values outside the known set must still be represented (and round-tripped) rather
//! than rejected. A plain Rust `enum` can't do that: matching on an unknown discriminant is a
//! hard error. [`nutype_enum!`] instead generates a tuple struct wrapping the underlying
//! representation, with one associated constant per named variant. Any value of the underlying
//! type is a valid instance; `match` arms fall back to a final binding pattern to catch anything
//! that isn't one of the named constants.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

/// Declares a newtype-style open enum around a primitive (or other `Copy + Eq`) representation.
///
/// ```
/// nutype_enum::nutype_enum! {
///     pub enum Color(u8) {
///         Red = 0,
///         Green = 1,
///         Blue = 2,
///     }
/// }
///
/// let c = Color(3);
/// match c {
///     Color::Red => unreachable!(),
///     Color::Green => unreachable!(),
///     Color::Blue => unreachable!(),
///     Color(other) => assert_eq!(other, 3),
/// }
/// ```
#[macro_export]
macro_rules! nutype_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident($repr:ty) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        $vis struct $name(pub $repr);

        impl $name {
            $(
                $(#[$variant_meta])*
                pub const $variant: Self = Self($value);
            )*
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match *self {
                    $(Self::$variant => f.write_str(concat!(stringify!($name), "::", stringify!($variant))),)*
                    Self(ref value) => write!(f, concat!(stringify!($name), "({:?})"), value),
                }
            }
        }

        impl ::std::convert::From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl ::std::convert::From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}
