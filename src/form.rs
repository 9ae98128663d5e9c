//! The form type and its combinator algebra.
//!
//! A [`Form`] is a pure description of a field tree plus a parser: filling
//! it against current dirty values yields a [`FilledForm`] holding the
//! evaluated fields and a tri-state result. Forms are built from single
//! fields and composed applicatively: [`Form::succeed`] starts a pipeline,
//! [`Form::with`] pairs another form's output into it, and [`Form::map`]
//! shapes the final output type.
//!
//! ```
//! use formkit::{FieldConfig, Form, TextOptions};
//!
//! #[derive(Clone)]
//! struct Values {
//!     name: String,
//! }
//!
//! let form: Form<Values, String> = Form::text(
//!     TextOptions::new("Name"),
//!     FieldConfig::new(
//!         |values: &Values| values.name.clone(),
//!         |name, _: &Values| Values { name },
//!         |name: &String| {
//!             if name.trim().is_empty() {
//!                 Err("Required".to_string())
//!             } else {
//!                 Ok(name.trim().to_string())
//!             }
//!         },
//!     ),
//! );
//!
//! let filled = form.fill(&Values { name: " Alice ".into() });
//! assert_eq!(filled.result.ok(), Some("Alice".to_string()));
//! ```

use std::rc::Rc;

use crate::error::ErrorSet;
use crate::field::{
    BaseField, CheckboxOptions, CustomOptions, DatePickerOptions, DecorationOptions, FieldConfig,
    FieldState, FileOptions, FilledField, GroupOptions, Lens, RadioOptions, RichTextOptions,
    SelectOptions, TextOptions, ToggleOptions, UserPickerOptions,
};
use crate::result::FillResult;
use crate::types::{CalendarDate, FieldId, FileState, ValidationStrategy};

// ============================================================================
// Filled form
// ============================================================================

/// The transient result of evaluating a form against current dirty values.
#[derive(Debug)]
pub struct FilledForm<V, O> {
    /// Every evaluated field, in composition order.
    pub fields: Vec<FilledField<V>>,
    /// The combined parse result.
    pub result: FillResult<O>,
}

impl<V, O> FilledForm<V, O> {
    /// All tracked field ids, groups flattened, in composition order.
    pub fn tracked_ids(&self) -> Vec<FieldId> {
        let mut ids = Vec::new();
        collect_ids(&self.fields, &mut ids);
        ids
    }

    /// Ids that appear more than once in this fill.
    ///
    /// Colliding ids silently merge two fields' error, blur and loading
    /// tracking, so top-level consumers log these as a composition bug.
    pub fn duplicate_ids(&self) -> Vec<FieldId> {
        let mut seen = std::collections::BTreeSet::new();
        let mut duplicates = Vec::new();
        for id in self.tracked_ids() {
            if !seen.insert(id.clone()) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }
        duplicates
    }
}

fn collect_ids<V>(fields: &[FilledField<V>], ids: &mut Vec<FieldId>) {
    for field in fields {
        if let FieldState::Group { children, .. } = &field.state {
            collect_ids(children, ids);
        } else if let Some(id) = field.state.id() {
            ids.push(id);
        }
    }
}

// ============================================================================
// Form
// ============================================================================

/// A composable description of fields and how to parse them.
///
/// `V` is the application's dirty values record, `O` the clean output
/// produced once every field validates. A form holds no state of its own:
/// it is a pure function from values to a [`FilledForm`], and composing
/// forms composes those functions.
pub struct Form<V, O> {
    fill: Rc<dyn Fn(&V) -> FilledForm<V, O>>,
}

impl<V, O> Clone for Form<V, O> {
    fn clone(&self) -> Self {
        Form {
            fill: Rc::clone(&self.fill),
        }
    }
}

impl<V: 'static, O: 'static> Form<V, O> {
    /// Build a form from a raw fill function. The combinators below should
    /// cover almost every case; this is the escape hatch they are built on.
    pub fn from_fill(fill: impl Fn(&V) -> FilledForm<V, O> + 'static) -> Self {
        Form {
            fill: Rc::new(fill),
        }
    }

    /// Evaluate the form against current dirty values.
    pub fn fill(&self, values: &V) -> FilledForm<V, O> {
        (self.fill)(values)
    }

    // ------------------------------------------------------------------------
    // Base cases
    // ------------------------------------------------------------------------

    /// A zero-field form that always resolves to the given output. The base
    /// case for applicative pipelines.
    pub fn succeed(output: O) -> Self
    where
        O: Clone,
    {
        Form::from_fill(move |_| FilledForm {
            fields: Vec::new(),
            result: FillResult::Ok(output.clone()),
        })
    }

    /// A zero-field form that never resolves: its result is the
    /// no-determination state, not an error.
    pub fn fail() -> Self {
        Form::from_fill(|_| FilledForm {
            fields: Vec::new(),
            result: FillResult::Undetermined,
        })
    }

    /// Fully custom interactive content. Contributes one tracked field and
    /// no determination; the page wires its own events against the field's
    /// id and mutates values through the regular change message.
    pub fn custom(options: CustomOptions) -> Self {
        Form::from_fill(move |_| FilledForm {
            fields: vec![FilledField {
                state: FieldState::Custom {
                    options: options.clone(),
                },
                error: None,
                strategy: ValidationStrategy::default(),
                is_required: false,
            }],
            result: FillResult::Undetermined,
        })
    }

    // ------------------------------------------------------------------------
    // Field constructors
    // ------------------------------------------------------------------------

    fn leaf<I: Clone + 'static>(
        config: FieldConfig<V, I, O>,
        build: impl Fn(BaseField<V, I>) -> FieldState<V> + 'static,
    ) -> Self {
        Form::from_fill(move |values| {
            let input = (config.value)(values);
            let state = build(BaseField {
                value: input.clone(),
                update: Rc::clone(&config.update),
            });
            let id = state.id().unwrap_or_else(|| FieldId::new("field"));
            // Parse failures take display precedence; an external error
            // overrides a successful parse.
            let (result, error) = match (config.parser)(&input) {
                Err(message) => (
                    FillResult::Err(ErrorSet::single(id, message.clone())),
                    Some(message),
                ),
                Ok(output) => match config.external_error.as_ref().and_then(|f| f(values)) {
                    Some(message) => (
                        FillResult::Err(ErrorSet::single(id, message.clone())),
                        Some(message),
                    ),
                    None => (FillResult::Ok(output), None),
                },
            };
            FilledForm {
                fields: vec![FilledField {
                    state,
                    error,
                    strategy: ValidationStrategy::default(),
                    is_required: true,
                }],
                result,
            }
        })
    }

    /// A single-line text field.
    pub fn text(options: TextOptions, config: FieldConfig<V, String, O>) -> Self {
        Form::leaf(config, move |field| FieldState::Text {
            options: options.clone(),
            field,
        })
    }

    /// A rich text (markup) field.
    pub fn rich_text(options: RichTextOptions, config: FieldConfig<V, String, O>) -> Self {
        Form::leaf(config, move |field| FieldState::RichText {
            options: options.clone(),
            field,
        })
    }

    /// A toggle (switch) field.
    pub fn toggle(options: ToggleOptions, config: FieldConfig<V, bool, O>) -> Self {
        Form::leaf(config, move |field| FieldState::Toggle {
            options: options.clone(),
            field,
        })
    }

    /// A checkbox field.
    pub fn checkbox(options: CheckboxOptions, config: FieldConfig<V, bool, O>) -> Self {
        Form::leaf(config, move |field| FieldState::Checkbox {
            options: options.clone(),
            field,
        })
    }

    /// A radio button group. The raw value is the selected choice key,
    /// empty when nothing is selected.
    pub fn radio(options: RadioOptions, config: FieldConfig<V, String, O>) -> Self {
        Form::leaf(config, move |field| FieldState::Radio {
            options: options.clone(),
            field,
        })
    }

    /// A select (dropdown) field. Same raw value semantics as [`radio`].
    ///
    /// [`radio`]: Form::radio
    pub fn select(options: SelectOptions, config: FieldConfig<V, String, O>) -> Self {
        Form::leaf(config, move |field| FieldState::Select {
            options: options.clone(),
            field,
        })
    }

    /// A file upload field. The raw value is the upload lifecycle state;
    /// parsers typically accept only the uploaded-URL state.
    pub fn file(options: FileOptions, config: FieldConfig<V, FileState, O>) -> Self {
        Form::leaf(config, move |field| FieldState::File {
            options: options.clone(),
            field,
        })
    }

    /// A date picker field.
    pub fn date_picker(
        options: DatePickerOptions,
        config: FieldConfig<V, Option<CalendarDate>, O>,
    ) -> Self {
        Form::leaf(config, move |field| FieldState::DatePicker {
            options: options.clone(),
            field,
        })
    }

    /// A user picker field. The raw value is the selected account names.
    pub fn user_picker(options: UserPickerOptions, config: FieldConfig<V, Vec<String>, O>) -> Self {
        Form::leaf(config, move |field| FieldState::UserPicker {
            options: options.clone(),
            field,
        })
    }

    // ------------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------------

    /// Applicative composition: pair another form's output into this one.
    ///
    /// Fields concatenate in composition order. Errors accumulate from both
    /// sides, the earlier (this) side's first error staying the overall
    /// first; a no-determination on either side makes the pair
    /// undetermined unless an error wins.
    pub fn with<A: 'static>(self, new: Form<V, A>) -> Form<V, (O, A)> {
        Form::from_fill(move |values| {
            let current = self.fill(values);
            let added = new.fill(values);
            let mut fields = current.fields;
            fields.extend(added.fields);
            FilledForm {
                fields,
                result: current.result.zip_with(added.result, |o, a| (o, a)),
            }
        })
    }

    /// Map the output type.
    pub fn map<T: 'static>(self, f: impl Fn(O) -> T + 'static) -> Form<V, T> {
        Form::from_fill(move |values| {
            let filled = self.fill(values);
            FilledForm {
                fields: filled.fields,
                result: filled.result.map(&f),
            }
        })
    }

    /// Make this form optional.
    ///
    /// If every field in it is structurally empty, all sub-field errors are
    /// suppressed, the fields are marked not-required, and the result is
    /// unconditionally `Ok(None)` — an empty optional section is never an
    /// error, even when its parsers would reject the empty value. Otherwise
    /// the underlying result applies, mapped into `Some`.
    pub fn optional(self) -> Form<V, Option<O>> {
        Form::from_fill(move |values| {
            let filled = self.fill(values);
            let all_empty = filled.fields.iter().all(|f| f.state.is_empty());
            if all_empty {
                let fields = filled
                    .fields
                    .into_iter()
                    .map(|mut field| {
                        field.error = None;
                        field.is_required = false;
                        field
                    })
                    .collect();
                FilledForm {
                    fields,
                    result: FillResult::Ok(None),
                }
            } else {
                FilledForm {
                    fields: filled.fields,
                    result: filled.result.map(Some),
                }
            }
        })
    }

    /// Combine a dynamic-length list of same-typed sub-forms.
    ///
    /// All individual errors accumulate; the first failing sub-form's first
    /// error is the overall first.
    pub fn list(forms: Vec<Form<V, O>>) -> Form<V, Vec<O>> {
        Form::from_fill(move |values| {
            let mut fields = Vec::new();
            let mut result = FillResult::Ok(Vec::with_capacity(forms.len()));
            for form in &forms {
                let filled = form.fill(values);
                fields.extend(filled.fields);
                result = result.zip_with(filled.result, |mut outputs, output| {
                    outputs.push(output);
                    outputs
                });
            }
            FilledForm { fields, result }
        })
    }

    /// Wrap two sub-forms' fields into one structural group for layout,
    /// combining their outputs. The group itself never errors and is never
    /// required; error attribution stays with the wrapped fields.
    pub fn group<A: 'static, B: 'static>(
        options: GroupOptions,
        a: Form<V, A>,
        b: Form<V, B>,
        combine: impl Fn(A, B) -> O + 'static,
    ) -> Self {
        Form::from_fill(move |values| {
            let left = a.fill(values);
            let right = b.fill(values);
            let mut children = left.fields;
            children.extend(right.fields);
            FilledForm {
                fields: vec![FilledField {
                    state: FieldState::Group {
                        options: options.clone(),
                        children,
                    },
                    error: None,
                    strategy: ValidationStrategy::default(),
                    is_required: false,
                }],
                result: left.result.zip_with(right.result, &combine),
            }
        })
    }

    /// Three-slot variant of [`group`].
    ///
    /// [`group`]: Form::group
    pub fn group3<A: 'static, B: 'static, C: 'static>(
        options: GroupOptions,
        a: Form<V, A>,
        b: Form<V, B>,
        c: Form<V, C>,
        combine: impl Fn(A, B, C) -> O + 'static,
    ) -> Self {
        Form::from_fill(move |values| {
            let first = a.fill(values);
            let second = b.fill(values);
            let third = c.fill(values);
            let mut children = first.fields;
            children.extend(second.fields);
            children.extend(third.fields);
            FilledForm {
                fields: vec![FilledField {
                    state: FieldState::Group {
                        options: options.clone(),
                        children,
                    },
                    error: None,
                    strategy: ValidationStrategy::default(),
                    is_required: false,
                }],
                result: first
                    .result
                    .zip3_with(second.result, third.result, &combine),
            }
        })
    }

    /// Re-scope this form from its own values type into a larger parent
    /// type via a bidirectional lens. Every field keeps working against the
    /// child shape; the outer form only exposes the parent.
    pub fn nested<P: 'static>(self, lens: Lens<P, V>) -> Form<P, O> {
        Form::from_fill(move |parent: &P| {
            let child = lens.get(parent);
            let filled = self.fill(&child);
            FilledForm {
                fields: filled
                    .fields
                    .into_iter()
                    .map(|field| field.map_values(&lens))
                    .collect(),
                result: filled.result,
            }
        })
    }

    /// Build the form as a function of the current dirty values, for fields
    /// whose presence or choices depend on earlier fields' input.
    pub fn introspect(build: impl Fn(&V) -> Form<V, O> + 'static) -> Self {
        Form::from_fill(move |values| build(values).fill(values))
    }

    /// Override the validation timing of every field in this form,
    /// including fields nested inside groups.
    pub fn validate_with(self, strategy: ValidationStrategy) -> Self {
        Form::from_fill(move |values| {
            let mut filled = self.fill(values);
            for field in &mut filled.fields {
                set_strategy(field, strategy);
            }
            filled
        })
    }

    /// Append inert decorative content after this form's fields. The result
    /// is untouched.
    pub fn with_decoration(self, options: DecorationOptions) -> Self {
        Form::from_fill(move |values| {
            let mut filled = self.fill(values);
            filled.fields.push(FilledField {
                state: FieldState::Decoration {
                    options: options.clone(),
                },
                error: None,
                strategy: ValidationStrategy::default(),
                is_required: false,
            });
            filled
        })
    }
}

fn set_strategy<V>(field: &mut FilledField<V>, strategy: ValidationStrategy) {
    field.strategy = strategy;
    if let FieldState::Group { children, .. } = &mut field.state {
        for child in children {
            set_strategy(child, strategy);
        }
    }
}
