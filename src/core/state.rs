//! State trait for machine states.
//!
//! Every machine owns an explicit state value. Combinators nest their
//! children's states inside tagged enums and structs, so states must be
//! cloneable, comparable and serializable all the way down.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Trait for machine states.
///
/// All methods are pure. A state is the entire continuation of a machine:
/// nothing else is needed to resume it.
///
/// # Required Traits
///
/// - `Clone`: states are cloned to replay or compare executions
/// - `PartialEq`: determinism is checked by comparing states
/// - `Debug`: states appear in fault messages
/// - `Serialize` + `DeserializeOwned`: states can be inspected and recorded
///
/// # Example
///
/// ```rust
/// use chanalg::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Locked,
///     Open,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Locked => "locked",
///             Self::Open => "open",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Open)
///     }
/// }
///
/// assert_eq!(Door::Locked.name(), "locked");
/// assert!(Door::Open.is_final());
/// ```
pub trait State: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync {
    /// Name of the state for logging and fault messages.
    fn name(&self) -> &str;

    /// Check if this is a final state.
    ///
    /// A machine in a final state accepts no further input.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
