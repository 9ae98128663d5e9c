//! # formkit
//!
//! A composable, type-safe form engine: declare fields once, compose them
//! applicatively, and get validation, error display timing, asynchronous
//! file uploads and a headless view projection from the same declaration.
//!
//! The engine separates three concerns:
//!
//! - **Dirty values** (`V`): the application-owned record every field reads
//!   from and writes into. Forms never own state.
//! - **The form** ([`Form<V, O>`]): a pure description of fields plus a
//!   parser producing a clean output `O` once every field validates.
//! - **The runtime** ([`Model<V>`]): interaction tracking — which errors
//!   are revealed, which uploads are in flight — driven by [`Msg`]s through
//!   [`Model::update`].
//!
//! ## Features
//!
//! - **regex**: pattern validation via regular expressions; without it,
//!   [`validators::Validator::matching`] degrades to a substring check
//!
//! ## Example
//!
//! ```rust
//! use formkit::{FieldConfig, Form, Model, SubmitOutcome, TextOptions};
//!
//! #[derive(Clone)]
//! struct Values {
//!     name: String,
//! }
//!
//! struct Profile {
//!     name: String,
//! }
//!
//! let form: Form<Values, Profile> = Form::succeed(())
//!     .with(Form::text(
//!         TextOptions::new("Name"),
//!         FieldConfig::new(
//!             |values: &Values| values.name.clone(),
//!             |name, _: &Values| Values { name },
//!             |name: &String| {
//!                 formkit::validators::validate(name)
//!                     .required("Please enter a name")
//!                     .finish()
//!                     .map(|()| name.trim().to_string())
//!             },
//!         ),
//!     ))
//!     .map(|((), name)| Profile { name });
//!
//! let model = Model::new(Values {
//!     name: "Alice".to_string(),
//! });
//! match model.submit(&form) {
//!     SubmitOutcome::Valid(profile) => assert_eq!(profile.name, "Alice"),
//!     _ => panic!("expected a valid submission"),
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod field;
pub mod form;
pub mod model;
pub mod result;
pub mod types;
pub mod validators;
pub mod view;

// Re-export commonly used items at crate root
pub use error::{ErrorSet, FieldError, UploadError};
pub use field::{
    BaseField, CheckboxOptions, Choice, CustomOptions, DatePickerOptions, DecorationOptions,
    FieldConfig, FieldFlags, FieldState, FileOptions, FilledField, GroupOptions, Lens,
    RadioOptions, RichTextOptions, SelectOptions, TextOptions, ToggleOptions, UserPickerOptions,
};
pub use form::{FilledForm, Form};
pub use model::{Command, Model, Msg, SubmitOutcome};
pub use result::FillResult;
pub use types::{CalendarDate, FieldId, FilePayload, FileState, ValidationStrategy};
pub use view::{view, FieldView, FormView, Widget};
