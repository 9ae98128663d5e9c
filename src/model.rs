//! The runtime model and update protocol.
//!
//! [`Model`] owns the dirty values plus all interaction tracking: which
//! errors have been revealed, which uploads are in flight, and whether the
//! whole form is disabled. The page feeds every [`Msg`] into
//! [`Model::update`] and executes the returned [`Command`]s; submission goes
//! through [`Model::submit`], which either yields the parsed output or a
//! message that reveals every error and focuses the first failing field.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use crate::error::UploadError;
use crate::form::Form;
use crate::result::FillResult;
use crate::types::{FieldId, FilePayload, FileState, ValidationStrategy};

// ============================================================================
// Messages
// ============================================================================

/// Applies a file upload outcome to the dirty values. Captured from the file
/// field's update closure, so it reads the values current at apply time.
pub type ApplyFileState<V> = Rc<dyn Fn(FileState, &V) -> V>;

/// Rewrites the dirty values. Carried instead of a values snapshot so that
/// two in-flight messages never clobber each other's edits.
pub type ValuesUpdater<V> = Rc<dyn Fn(&V) -> V>;

/// Every event the form runtime reacts to.
pub enum Msg<V> {
    /// A field's value changed. The updater is applied against the model's
    /// current values when the message is processed, and the field's
    /// revealed error (if any) is hidden again until the next blur.
    UpdatedValues {
        /// The field whose widget produced the change; `None` for
        /// programmatic bulk updates, which touch no error tracking.
        field: Option<FieldId>,
        /// Rewrites the dirty values.
        updater: ValuesUpdater<V>,
    },
    /// A field lost focus. Validity is computed at view time, against the
    /// same fill the widget was rendered from.
    Blurred {
        /// The blurred field.
        field: FieldId,
        /// Whether the field currently fails validation.
        has_error: bool,
        /// Whether the field is structurally empty.
        is_empty: bool,
    },
    /// The user picked a file on a file field.
    RequestedFileUpload {
        /// The file field.
        field: FieldId,
        /// The chosen file.
        file: FilePayload,
        /// Writes the new upload state into the values.
        apply: ApplyFileState<V>,
    },
    /// An upload the page started earlier finished.
    CompletedFileUpload {
        /// The file field.
        field: FieldId,
        /// The generation the upload was started with. A completion whose
        /// generation no longer matches is stale and is discarded.
        generation: u64,
        /// The uploaded URL, or why the upload failed.
        result: Result<String, UploadError>,
        /// Writes the new upload state into the values.
        apply: ApplyFileState<V>,
    },
    /// A submit attempt found validation errors: reveal all of them and
    /// focus the first failing field.
    SubmittedWithErrors {
        /// The earliest composed failing field.
        first_error: FieldId,
    },
}

impl<V> Clone for Msg<V> {
    fn clone(&self) -> Self {
        match self {
            Msg::UpdatedValues { field, updater } => Msg::UpdatedValues {
                field: field.clone(),
                updater: Rc::clone(updater),
            },
            Msg::Blurred {
                field,
                has_error,
                is_empty,
            } => Msg::Blurred {
                field: field.clone(),
                has_error: *has_error,
                is_empty: *is_empty,
            },
            Msg::RequestedFileUpload { field, file, apply } => Msg::RequestedFileUpload {
                field: field.clone(),
                file: file.clone(),
                apply: Rc::clone(apply),
            },
            Msg::CompletedFileUpload {
                field,
                generation,
                result,
                apply,
            } => Msg::CompletedFileUpload {
                field: field.clone(),
                generation: *generation,
                result: result.clone(),
                apply: Rc::clone(apply),
            },
            Msg::SubmittedWithErrors { first_error } => Msg::SubmittedWithErrors {
                first_error: first_error.clone(),
            },
        }
    }
}

impl<V> fmt::Debug for Msg<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Msg::UpdatedValues { field, .. } => f
                .debug_struct("UpdatedValues")
                .field("field", field)
                .finish(),
            Msg::Blurred {
                field,
                has_error,
                is_empty,
            } => f
                .debug_struct("Blurred")
                .field("field", field)
                .field("has_error", has_error)
                .field("is_empty", is_empty)
                .finish(),
            Msg::RequestedFileUpload { field, file, .. } => f
                .debug_struct("RequestedFileUpload")
                .field("field", field)
                .field("file", file)
                .finish(),
            Msg::CompletedFileUpload {
                field,
                generation,
                result,
                ..
            } => f
                .debug_struct("CompletedFileUpload")
                .field("field", field)
                .field("generation", generation)
                .field("result", result)
                .finish(),
            Msg::SubmittedWithErrors { first_error } => f
                .debug_struct("SubmittedWithErrors")
                .field("first_error", first_error)
                .finish(),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Side effects [`Model::update`] asks the page to perform.
pub enum Command<V> {
    /// Start uploading the file through whatever transport the page uses,
    /// then feed the outcome back as [`Msg::CompletedFileUpload`] with the
    /// same `field`, `generation` and `apply`.
    UploadFile {
        /// The file field.
        field: FieldId,
        /// Echo this in the completion message.
        generation: u64,
        /// The chosen file.
        file: FilePayload,
        /// Echo this in the completion message.
        apply: ApplyFileState<V>,
    },
    /// Move focus to this field.
    Focus(FieldId),
    /// Show the user a transient notification.
    Notify(String),
}

impl<V> fmt::Debug for Command<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::UploadFile {
                field,
                generation,
                file,
                ..
            } => f
                .debug_struct("UploadFile")
                .field("field", field)
                .field("generation", generation)
                .field("file", file)
                .finish(),
            Command::Focus(field) => f.debug_tuple("Focus").field(field).finish(),
            Command::Notify(text) => f.debug_tuple("Notify").field(text).finish(),
        }
    }
}

// ============================================================================
// Submit outcome
// ============================================================================

/// What a submit attempt resolved to.
#[derive(Debug)]
pub enum SubmitOutcome<V, O> {
    /// The form is disabled or an upload is in flight; nothing happened.
    Blocked,
    /// Every field validated; here is the parsed output.
    Valid(O),
    /// Validation failed. Feed the message back through [`Model::update`]
    /// to reveal every error and focus the first failing field.
    Invalid(Msg<V>),
    /// The form never resolved (degenerate composition or custom-only
    /// content); submission cannot proceed.
    Undetermined,
}

// ============================================================================
// Model
// ============================================================================

/// The runtime state of one form instance.
#[derive(Debug)]
pub struct Model<V> {
    values: V,
    show_all_errors: bool,
    show_field_error: BTreeSet<FieldId>,
    loading_fields: BTreeSet<FieldId>,
    upload_generation: BTreeMap<FieldId, u64>,
    disabled: bool,
}

impl<V: Clone + 'static> Model<V> {
    /// A fresh model around initial dirty values. No errors shown, nothing
    /// loading, enabled.
    pub fn new(values: V) -> Self {
        Model {
            values,
            show_all_errors: false,
            show_field_error: BTreeSet::new(),
            loading_fields: BTreeSet::new(),
            upload_generation: BTreeMap::new(),
            disabled: false,
        }
    }

    /// Disable the whole form (builder form).
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The current dirty values.
    pub fn values(&self) -> &V {
        &self.values
    }

    /// Consume the model, keeping the dirty values.
    pub fn into_values(self) -> V {
        self.values
    }

    /// Whether the whole form is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable or re-enable the whole form.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether any upload is currently in flight.
    pub fn has_fields_loading(&self) -> bool {
        !self.loading_fields.is_empty()
    }

    /// Whether this field's upload is in flight.
    pub fn is_field_loading(&self, field: &FieldId) -> bool {
        self.loading_fields.contains(field)
    }

    /// Replace the dirty values and drop all interaction tracking, as if the
    /// form had just been created. In-flight uploads are orphaned: their
    /// generations are gone, so their completions will be discarded as
    /// stale.
    pub fn reset(&mut self, values: V) {
        self.values = values;
        self.show_all_errors = false;
        self.show_field_error.clear();
        self.loading_fields.clear();
        self.upload_generation.clear();
    }

    /// Whether a field's error should be displayed, given its validation
    /// strategy and the current tracking state.
    pub fn error_visible(&self, field: &FieldId, strategy: ValidationStrategy) -> bool {
        match strategy {
            ValidationStrategy::OnBlur => {
                self.show_all_errors || self.show_field_error.contains(field)
            }
            ValidationStrategy::OnSubmit => self.show_all_errors,
        }
    }

    /// Process one message, returning the side effects the page must run.
    pub fn update(&mut self, msg: Msg<V>) -> Vec<Command<V>> {
        match msg {
            Msg::UpdatedValues { field, updater } => {
                self.values = updater(&self.values);
                // Typing into a field re-hides its revealed error until the
                // next blur.
                if let Some(field) = field {
                    self.show_field_error.remove(&field);
                }
                Vec::new()
            }
            Msg::Blurred {
                field, has_error, ..
            } => {
                // Blur reveals a standing error and re-hides a resolved one.
                if has_error {
                    self.show_field_error.insert(field);
                } else {
                    self.show_field_error.remove(&field);
                }
                Vec::new()
            }
            Msg::RequestedFileUpload { field, file, apply } => {
                let generation = self
                    .upload_generation
                    .entry(field.clone())
                    .and_modify(|g| *g += 1)
                    .or_insert(1);
                let generation = *generation;
                log::debug!(
                    "starting upload for field `{}` (generation {})",
                    field,
                    generation
                );
                self.loading_fields.insert(field.clone());
                self.values = apply(FileState::Loading, &self.values);
                vec![Command::UploadFile {
                    field,
                    generation,
                    file,
                    apply,
                }]
            }
            Msg::CompletedFileUpload {
                field,
                generation,
                result,
                apply,
            } => {
                let current = self.upload_generation.get(&field).copied().unwrap_or(0);
                if generation != current {
                    // A newer upload superseded this one (or the model was
                    // reset); the newer completion will settle the field.
                    log::warn!(
                        "discarding stale upload completion for field `{}` \
                         (generation {} != current {})",
                        field,
                        generation,
                        current
                    );
                    return Vec::new();
                }
                self.loading_fields.remove(&field);
                log::debug!(
                    "upload for field `{}` (generation {}) finished: {}",
                    field,
                    generation,
                    if result.is_ok() { "ok" } else { "failed" }
                );
                match result {
                    Ok(url) => {
                        self.values = apply(FileState::Loaded(url), &self.values);
                        Vec::new()
                    }
                    Err(error) => {
                        let message = error.to_string();
                        self.values = apply(FileState::Failed(message.clone()), &self.values);
                        vec![Command::Notify(message)]
                    }
                }
            }
            Msg::SubmittedWithErrors { first_error } => {
                self.show_all_errors = true;
                vec![Command::Focus(first_error)]
            }
        }
    }

    /// Attempt to submit the form against the current dirty values.
    ///
    /// Blocked while the form is disabled or any upload is in flight. On
    /// validation failure the returned message must be fed back through
    /// [`Model::update`] so every error becomes visible.
    pub fn submit<O: 'static>(&self, form: &Form<V, O>) -> SubmitOutcome<V, O> {
        if self.disabled || self.has_fields_loading() {
            return SubmitOutcome::Blocked;
        }
        let filled = form.fill(&self.values);
        for id in filled.duplicate_ids() {
            log::warn!("duplicate field id `{}`; tracking will conflate these fields", id);
        }
        match filled.result {
            FillResult::Ok(output) => SubmitOutcome::Valid(output),
            FillResult::Err(errors) => SubmitOutcome::Invalid(Msg::SubmittedWithErrors {
                first_error: errors.first().field.clone(),
            }),
            FillResult::Undetermined => {
                log::warn!("form resolved to no determination on submit");
                SubmitOutcome::Undetermined
            }
        }
    }
}
