//! Headless view projection.
//!
//! [`view`] turns a form plus its runtime model into a tree of
//! [`FieldView`] descriptors: every widget's current value, its resolved
//! error visibility, and ready-made event constructors that produce the
//! [`Msg`]s the page feeds back into [`Model::update`]. No rendering
//! happens here; the page maps each [`Widget`] onto whatever UI toolkit it
//! uses.

use std::rc::Rc;

use crate::field::{
    CheckboxOptions, CustomOptions, DatePickerOptions, DecorationOptions, FieldFlags, FieldState,
    FileOptions, FilledField, GroupOptions, RadioOptions, RichTextOptions, SelectOptions,
    TextOptions, ToggleOptions, UpdateFn, UserPickerOptions,
};
use crate::form::Form;
use crate::model::{ApplyFileState, Model, Msg};
use crate::types::{CalendarDate, FieldId, FilePayload, FileState};

// ============================================================================
// View tree
// ============================================================================

/// The whole form, projected for rendering.
pub struct FormView<V> {
    /// One descriptor per field, in composition order.
    pub fields: Vec<FieldView<V>>,
    /// Whether the submit control should be inert (form disabled or an
    /// upload in flight).
    pub submit_blocked: bool,
}

/// One field, projected for rendering.
pub struct FieldView<V> {
    /// Tracking id; `None` for groups and decorations.
    pub id: Option<FieldId>,
    /// The error to display right now. Already filtered through the field's
    /// validation strategy and the model's tracking state: `None` either
    /// means the field is valid or its error is not yet revealed.
    pub error: Option<String>,
    /// Whether the field currently fails validation, shown or not.
    pub has_error: bool,
    /// Whether the surrounding composition requires this field.
    pub is_required: bool,
    /// Form-wide disable or the field's own flag.
    pub disabled: bool,
    /// Whether this field's upload is in flight.
    pub loading: bool,
    /// The field's presentation flags.
    pub flags: FieldFlags,
    /// The kind-specific widget payload.
    pub widget: Widget<V>,
}

/// Constructs the change message for a widget's new value.
pub type OnChange<V, I> = Rc<dyn Fn(I) -> Msg<V>>;

/// Kind-specific widget payloads with their event constructors.
pub enum Widget<V> {
    /// Single-line text input.
    Text {
        /// Rendering options.
        options: TextOptions,
        /// Current raw value.
        value: String,
        /// Message for a new value.
        on_change: OnChange<V, String>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// Rich text editor.
    RichText {
        /// Rendering options.
        options: RichTextOptions,
        /// Current raw value.
        value: String,
        /// Message for a new value.
        on_change: OnChange<V, String>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// Boolean switch.
    Toggle {
        /// Rendering options.
        options: ToggleOptions,
        /// Current raw value.
        value: bool,
        /// Message for a new value.
        on_change: OnChange<V, bool>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// Boolean checkbox.
    Checkbox {
        /// Rendering options.
        options: CheckboxOptions,
        /// Current raw value.
        value: bool,
        /// Message for a new value.
        on_change: OnChange<V, bool>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// Radio button group; the value is the selected choice key.
    Radio {
        /// Rendering options.
        options: RadioOptions,
        /// Current selected key, empty for none.
        value: String,
        /// Message for a new selection.
        on_change: OnChange<V, String>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// Dropdown; same value semantics as `Radio`.
    Select {
        /// Rendering options.
        options: SelectOptions,
        /// Current selected key, empty for none.
        value: String,
        /// Message for a new selection.
        on_change: OnChange<V, String>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// File picker; selecting a file starts an upload.
    File {
        /// Rendering options.
        options: FileOptions,
        /// Current upload lifecycle state.
        state: FileState,
        /// Message for a newly picked file.
        on_select: Rc<dyn Fn(FilePayload) -> Msg<V>>,
    },
    /// Date picker.
    DatePicker {
        /// Rendering options.
        options: DatePickerOptions,
        /// Current raw value.
        value: Option<CalendarDate>,
        /// Message for a new value.
        on_change: OnChange<V, Option<CalendarDate>>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// User picker.
    UserPicker {
        /// Rendering options.
        options: UserPickerOptions,
        /// Current selected account names.
        value: Vec<String>,
        /// Message for a new selection.
        on_change: OnChange<V, Vec<String>>,
        /// Message for losing focus.
        on_blur: Msg<V>,
    },
    /// Structural group wrapping already-projected children.
    Group {
        /// Layout options.
        options: GroupOptions,
        /// The wrapped fields.
        children: Vec<FieldView<V>>,
    },
    /// Inert decorative content.
    Decoration {
        /// The content payload.
        options: DecorationOptions,
    },
    /// Custom content the page wires itself, keyed by id and tag.
    Custom {
        /// Id and widget tag.
        options: CustomOptions,
    },
}

// ============================================================================
// Projection
// ============================================================================

/// Fill the form against the model's current values and project every field
/// for rendering.
pub fn view<V: Clone + 'static, O: 'static>(form: &Form<V, O>, model: &Model<V>) -> FormView<V> {
    let filled = form.fill(model.values());
    for id in filled.duplicate_ids() {
        log::warn!("duplicate field id `{}`; tracking will conflate these fields", id);
    }
    FormView {
        fields: filled
            .fields
            .into_iter()
            .map(|field| project(field, model))
            .collect(),
        submit_blocked: model.is_disabled() || model.has_fields_loading(),
    }
}

fn project<V: Clone + 'static>(field: FilledField<V>, model: &Model<V>) -> FieldView<V> {
    let FilledField {
        state,
        error,
        strategy,
        is_required,
    } = field;

    let id = state.id();
    let flags = state.flags();
    let is_empty = state.is_empty();
    let has_error = error.is_some();
    let visible_error = match &id {
        Some(id) if model.error_visible(id, strategy) => error,
        _ => None,
    };
    let loading = id
        .as_ref()
        .map(|id| model.is_field_loading(id))
        .unwrap_or(false);
    let disabled = model.is_disabled() || flags.contains(FieldFlags::DISABLED);

    let blur = |id: &Option<FieldId>| Msg::Blurred {
        field: id.clone().unwrap_or_else(|| FieldId::new("field")),
        has_error,
        is_empty,
    };

    let widget = match state {
        FieldState::Text { options, field } => Widget::Text {
            options,
            value: field.value.clone(),
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::RichText { options, field } => Widget::RichText {
            options,
            value: field.value.clone(),
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::Toggle { options, field } => Widget::Toggle {
            options,
            value: field.value,
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::Checkbox { options, field } => Widget::Checkbox {
            options,
            value: field.value,
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::Radio { options, field } => Widget::Radio {
            options,
            value: field.value.clone(),
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::Select { options, field } => Widget::Select {
            options,
            value: field.value.clone(),
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::File { options, field } => {
            let upload_field = id.clone().unwrap_or_else(|| FieldId::new("field"));
            let apply: ApplyFileState<V> = field.update;
            Widget::File {
                options,
                state: field.value,
                on_select: Rc::new(move |file| Msg::RequestedFileUpload {
                    field: upload_field.clone(),
                    file,
                    apply: Rc::clone(&apply),
                }),
            }
        }
        FieldState::DatePicker { options, field } => Widget::DatePicker {
            options,
            value: field.value,
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::UserPicker { options, field } => Widget::UserPicker {
            options,
            value: field.value.clone(),
            on_change: on_change(id.clone(), field.update),
            on_blur: blur(&id),
        },
        FieldState::Group { options, children } => Widget::Group {
            options,
            children: children
                .into_iter()
                .map(|child| project(child, model))
                .collect(),
        },
        FieldState::Decoration { options } => Widget::Decoration { options },
        FieldState::Custom { options } => Widget::Custom { options },
    };

    FieldView {
        id,
        error: visible_error,
        has_error,
        is_required,
        disabled,
        loading,
        flags,
        widget,
    }
}

/// Wrap a field's update closure into a change-message constructor. The
/// produced updater re-reads the values current when the message is
/// processed, so concurrent edits to other fields survive; the carried id
/// lets the model re-hide the field's revealed error while the user types.
fn on_change<V: 'static, I: Clone + 'static>(
    field: Option<FieldId>,
    update: UpdateFn<V, I>,
) -> OnChange<V, I> {
    Rc::new(move |input: I| {
        let update = Rc::clone(&update);
        Msg::UpdatedValues {
            field: field.clone(),
            updater: Rc::new(move |values| update(input.clone(), values)),
        }
    })
}
