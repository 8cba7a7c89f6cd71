//! Macros for declaring state and input identifiers.

/// Declare a fieldless enum usable as a state or input identifier.
///
/// The enum derives the traits [`Symbol`](crate::core::Symbol) needs and
/// gains `name()`, returning the variant name, and `ALL`, listing the
/// variants in declaration order. Together they make registration a loop.
///
/// # Example
///
/// ```
/// use statebridge::symbol_enum;
///
/// symbol_enum! {
///     pub enum TrafficLight {
///         Red,
///         Yellow,
///         Green,
///     }
/// }
///
/// assert_eq!(TrafficLight::Yellow.name(), "Yellow");
/// assert_eq!(TrafficLight::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! symbol_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Debug,
            $crate::__serde::Serialize,
            $crate::__serde::Deserialize,
        )]
        #[serde(crate = "statebridge::__serde")]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Display name used when registering the variant.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
