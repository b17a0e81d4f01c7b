//! # Parameter System
//!
//! Named, validated model parameters for light-curve fitting.
//!
//! ## Core Components
//!
//! - [`ParamValue`]: the tagged value union (number, string, boolean, sequence)
//! - [`ParamInput`]: raw input to an assignment, before normalization
//! - [`Parameter`]: a single immutable value slot with optional bounds and a vary flag
//! - [`ParameterSet`]: a collection of parameters with an append-only history,
//!   loadable from `.txt` and `.json` files
//! - [`Bounds`] and [`BoundsTransform`]: numeric bounds as seen by the fitter
//!
//! ## Example Usage
//!
//! ```rust
//! use lcfit_rs::parameters::{ParameterSet, ParamInput};
//!
//! let mut params = ParameterSet::load(
//!     None,
//!     vec![
//!         ("a", ParamInput::from(20.0)),
//!         ("inc", ParamInput::from((89.0, false))),
//!         ("limb_dark", ParamInput::from("quadratic")),
//!     ],
//! )
//! .unwrap();
//!
//! // Later assignments replace the parameter and extend the history
//! params.set("a", (15.0, true, 10.0, 30.0)).unwrap();
//! assert_eq!(params.get("a").unwrap().numeric_value(), Some(15.0));
//! assert_eq!(params.history().len(), 4);
//! ```

pub mod bounds;
pub mod io;
pub mod parameter;
pub mod parameters;
pub mod value;


// Re-export key types
pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use io::ParamFormat;
pub use parameter::{Parameter, ParameterValues};
pub use parameters::{HistoryRetention, ParameterSet, LIMB_DARK_PARAM};
pub use value::{ParamInput, ParamValue, ValueKind};
