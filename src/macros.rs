//! Macros for declaring machine states and asserting transcripts.

/// Generate a `State` implementation for a unit-variant enum.
///
/// Variant names double as state names.
///
/// # Example
///
/// ```
/// use chanalg::state_enum;
/// use chanalg::core::State;
///
/// state_enum! {
///     pub enum Latch {
///         Open,
///         Closed,
///     }
///     final: [Closed]
/// }
///
/// assert_eq!(Latch::Open.name(), "Open");
/// assert!(Latch::Closed.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            #[allow(unreachable_patterns)]
            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }
        }
    };
}

/// Assert that a transcript is a complete, legal execution of a protocol.
///
/// Panics with the mismatch reason otherwise.
///
/// # Example
///
/// ```
/// use chanalg::assert_transcript;
/// use chanalg::protocol::Grammar;
///
/// let mut g = Grammar::new();
/// let hello = g.emit("hello");
/// assert_transcript!(g, hello, ["hello"]);
/// ```
#[macro_export]
macro_rules! assert_transcript {
    ($grammar:expr, $node:expr, [$($token:expr),* $(,)?]) => {{
        let tokens: ::std::vec::Vec<::std::string::String> =
            ::std::vec![$(::std::string::ToString::to_string(&$token)),*];
        if let ::std::result::Result::Err(mismatch) = $grammar.check($node, &tokens) {
            panic!("transcript {:?} rejected: {}", tokens, mismatch);
        }
    }};
}

/// Assert that a transcript is rejected by a protocol.
///
/// Evaluates to the `Mismatch` so callers can inspect the reason.
#[macro_export]
macro_rules! refute_transcript {
    ($grammar:expr, $node:expr, [$($token:expr),* $(,)?]) => {{
        let tokens: ::std::vec::Vec<::std::string::String> =
            ::std::vec![$(::std::string::ToString::to_string(&$token)),*];
        match $grammar.check($node, &tokens) {
            ::std::result::Result::Ok(()) => {
                panic!("transcript {:?} unexpectedly accepted", tokens)
            }
            ::std::result::Result::Err(mismatch) => mismatch,
        }
    }};
}
