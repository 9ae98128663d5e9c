//! Field abstraction: the closed set of field kinds, their options, and the
//! typed value/update pair each field carries against the dirty values.
//!
//! A field never owns the application's dirty values. It holds the typed
//! value extracted from them during a fill, plus an update closure that
//! produces a whole new dirty-values record from a new typed value and the
//! values current at apply time. Re-reading current values at apply time is
//! what lets asynchronous completions land without clobbering concurrent
//! edits to other fields.

use std::fmt;
use std::rc::Rc;

use crate::types::{CalendarDate, FieldId, FileState, ValidationStrategy};

// ============================================================================
// Field option flags
// ============================================================================

bitflags::bitflags! {
    /// Presentation flags shared by every field kind.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u32 {
        /// Field is explicitly disabled, regardless of the form-wide flag.
        const DISABLED = 0x0001;
        /// Field is not rendered.
        const HIDDEN = 0x0002;
        /// Field is rendered but not editable.
        const READONLY = 0x0004;
        /// Field requests focus when the form first renders.
        const AUTOFOCUS = 0x0008;
    }
}

// ============================================================================
// Per-kind rendering options
// ============================================================================

macro_rules! common_option_methods {
    () => {
        /// Override the derived field id.
        pub fn with_id(mut self, id: impl Into<String>) -> Self {
            self.id = Some(id.into());
            self
        }

        /// Set presentation flags.
        pub fn with_flags(mut self, flags: FieldFlags) -> Self {
            self.flags = flags;
            self
        }

        /// The id used for error, blur and loading tracking: the explicit id
        /// if set, otherwise derived from the label.
        pub fn field_id(&self) -> FieldId {
            match &self.id {
                Some(id) => FieldId::new(id.clone()),
                None => FieldId::from_label(&self.label),
            }
        }
    };
}

/// Options for a single-line text field.
#[derive(Clone, Debug, Default)]
pub struct TextOptions {
    /// Label shown next to the input.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// Placeholder shown while the field is empty.
    pub placeholder: Option<String>,
    /// Maximum number of characters, surfaced to the widget as a counter.
    pub max_length: Option<usize>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl TextOptions {
    /// Options with the given label and defaults everywhere else.
    pub fn new(label: impl Into<String>) -> Self {
        TextOptions {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the character limit.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    common_option_methods!();
}

/// Options for a rich text (markup) field.
#[derive(Clone, Debug, Default)]
pub struct RichTextOptions {
    /// Label shown next to the editor.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// Placeholder shown while the editor is empty.
    pub placeholder: Option<String>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl RichTextOptions {
    /// Options with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        RichTextOptions {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    common_option_methods!();
}

/// Options for a toggle (switch) field.
#[derive(Clone, Debug, Default)]
pub struct ToggleOptions {
    /// Label shown next to the switch.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl ToggleOptions {
    /// Options with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        ToggleOptions {
            label: label.into(),
            ..Default::default()
        }
    }

    common_option_methods!();
}

/// Options for a checkbox field.
#[derive(Clone, Debug, Default)]
pub struct CheckboxOptions {
    /// Label shown next to the box.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl CheckboxOptions {
    /// Options with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        CheckboxOptions {
            label: label.into(),
            ..Default::default()
        }
    }

    common_option_methods!();
}

/// One selectable choice for radio and select fields: `(key, label)`.
pub type Choice = (String, String);

/// Options for a radio button group.
#[derive(Clone, Debug, Default)]
pub struct RadioOptions {
    /// Label shown above the group.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// The selectable choices.
    pub choices: Vec<Choice>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl RadioOptions {
    /// Options with the given label and choices.
    pub fn new(label: impl Into<String>, choices: Vec<Choice>) -> Self {
        RadioOptions {
            label: label.into(),
            choices,
            ..Default::default()
        }
    }

    common_option_methods!();
}

/// Options for a select (dropdown) field.
#[derive(Clone, Debug, Default)]
pub struct SelectOptions {
    /// Label shown next to the dropdown.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// The selectable choices.
    pub choices: Vec<Choice>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl SelectOptions {
    /// Options with the given label and choices.
    pub fn new(label: impl Into<String>, choices: Vec<Choice>) -> Self {
        SelectOptions {
            label: label.into(),
            choices,
            ..Default::default()
        }
    }

    common_option_methods!();
}

/// Options for a file upload field.
#[derive(Clone, Debug, Default)]
pub struct FileOptions {
    /// Label shown on the picker.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// Accepted MIME types, empty meaning any.
    pub accept: Vec<String>,
    /// Maximum file size in bytes, surfaced to the widget.
    pub max_bytes: Option<u64>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl FileOptions {
    /// Options with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        FileOptions {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Restrict accepted MIME types.
    pub fn with_accept(mut self, accept: Vec<String>) -> Self {
        self.accept = accept;
        self
    }

    /// Set the size limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    common_option_methods!();
}

/// Options for a date picker field.
#[derive(Clone, Debug, Default)]
pub struct DatePickerOptions {
    /// Label shown next to the picker.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// Earliest selectable date.
    pub min: Option<CalendarDate>,
    /// Latest selectable date.
    pub max: Option<CalendarDate>,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl DatePickerOptions {
    /// Options with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        DatePickerOptions {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Restrict the selectable range.
    pub fn with_range(mut self, min: CalendarDate, max: CalendarDate) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    common_option_methods!();
}

/// Options for a user picker field (selecting account names).
#[derive(Clone, Debug, Default)]
pub struct UserPickerOptions {
    /// Label shown next to the picker.
    pub label: String,
    /// Explicit id override.
    pub id: Option<String>,
    /// Whether more than one user can be selected.
    pub multiple: bool,
    /// Presentation flags.
    pub flags: FieldFlags,
}

impl UserPickerOptions {
    /// Options with the given label, selecting a single user.
    pub fn new(label: impl Into<String>) -> Self {
        UserPickerOptions {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Allow selecting multiple users.
    pub fn with_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    common_option_methods!();
}

/// Options for a structural group: layout only, no value and no error.
#[derive(Clone, Debug, Default)]
pub struct GroupOptions {
    /// Optional id, for layout targeting only; groups are never tracked.
    pub id: Option<String>,
}

impl GroupOptions {
    /// Options with no id.
    pub fn new() -> Self {
        GroupOptions::default()
    }

    /// Set a layout id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Inert decorative content carried between fields.
#[derive(Clone, Debug, Default)]
pub struct DecorationOptions {
    /// Opaque content for the widget layer (markup, a widget key, etc.).
    pub content: String,
}

impl DecorationOptions {
    /// Decoration carrying the given content.
    pub fn new(content: impl Into<String>) -> Self {
        DecorationOptions {
            content: content.into(),
        }
    }
}

/// Fully custom interactive content.
///
/// The core gives it an id so the page can wire its own events; the `tag`
/// tells the widget layer which custom widget to render. A custom field
/// contributes no determination to the form result.
#[derive(Clone, Debug)]
pub struct CustomOptions {
    /// Tracking id for the custom content.
    pub id: String,
    /// Which custom widget the page should render.
    pub tag: String,
}

impl CustomOptions {
    /// Options with the given id and widget tag.
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        CustomOptions {
            id: id.into(),
            tag: tag.into(),
        }
    }
}

// ============================================================================
// Base field
// ============================================================================

/// Closure producing a whole new dirty-values record from a new typed value
/// and the values current at apply time.
pub type UpdateFn<V, I> = Rc<dyn Fn(I, &V) -> V>;

/// The typed core every non-structural field carries: the value extracted
/// from the dirty values during this fill, and the update closure.
pub struct BaseField<V, I> {
    /// The field's current typed value.
    pub value: I,
    /// Produces new dirty values from a new typed value. Always reads the
    /// values passed at apply time, never a snapshot.
    pub update: UpdateFn<V, I>,
}

impl<V, I: Clone> Clone for BaseField<V, I> {
    fn clone(&self) -> Self {
        BaseField {
            value: self.value.clone(),
            update: Rc::clone(&self.update),
        }
    }
}

impl<V, I: fmt::Debug> fmt::Debug for BaseField<V, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseField")
            .field("value", &self.value)
            .finish()
    }
}

// ============================================================================
// Field configuration
// ============================================================================

/// Everything a field constructor needs besides rendering options.
///
/// `parser` turns raw typed input into validated output or a message.
/// `external_error` injects a failure computed outside the field's own value
/// (for example server-side uniqueness); it overrides a successful parse,
/// but a parse failure takes display precedence.
pub struct FieldConfig<V, I, O> {
    pub(crate) parser: Rc<dyn Fn(&I) -> Result<O, String>>,
    pub(crate) value: Rc<dyn Fn(&V) -> I>,
    pub(crate) update: UpdateFn<V, I>,
    pub(crate) external_error: Option<Rc<dyn Fn(&V) -> Option<String>>>,
}

impl<V, I, O> FieldConfig<V, I, O> {
    /// Build a config from a getter, a setter and a parser.
    pub fn new(
        value: impl Fn(&V) -> I + 'static,
        update: impl Fn(I, &V) -> V + 'static,
        parser: impl Fn(&I) -> Result<O, String> + 'static,
    ) -> Self {
        FieldConfig {
            parser: Rc::new(parser),
            value: Rc::new(value),
            update: Rc::new(update),
            external_error: None,
        }
    }

    /// Inject a validation failure computed from the whole dirty values.
    pub fn with_external_error(
        mut self,
        external_error: impl Fn(&V) -> Option<String> + 'static,
    ) -> Self {
        self.external_error = Some(Rc::new(external_error));
        self
    }
}

impl<V, I, O> Clone for FieldConfig<V, I, O> {
    fn clone(&self) -> Self {
        FieldConfig {
            parser: Rc::clone(&self.parser),
            value: Rc::clone(&self.value),
            update: Rc::clone(&self.update),
            external_error: self.external_error.as_ref().map(Rc::clone),
        }
    }
}

// ============================================================================
// Field state
// ============================================================================

/// The closed set of field kinds, evaluated against current dirty values.
///
/// Non-structural variants carry their rendering options plus a
/// [`BaseField`]; `Group` wraps already-filled sub-fields for layout;
/// `Decoration` and `Custom` carry no value at all.
pub enum FieldState<V> {
    /// Single-line text input.
    Text {
        /// Rendering options.
        options: TextOptions,
        /// Typed value and update closure.
        field: BaseField<V, String>,
    },
    /// Rich text (markup) editor.
    RichText {
        /// Rendering options.
        options: RichTextOptions,
        /// Typed value and update closure.
        field: BaseField<V, String>,
    },
    /// Boolean switch.
    Toggle {
        /// Rendering options.
        options: ToggleOptions,
        /// Typed value and update closure.
        field: BaseField<V, bool>,
    },
    /// Boolean checkbox.
    Checkbox {
        /// Rendering options.
        options: CheckboxOptions,
        /// Typed value and update closure.
        field: BaseField<V, bool>,
    },
    /// Single choice from a radio group; the value is the selected key, or
    /// empty when nothing is selected.
    Radio {
        /// Rendering options.
        options: RadioOptions,
        /// Typed value and update closure.
        field: BaseField<V, String>,
    },
    /// Single choice from a dropdown; same value semantics as `Radio`.
    Select {
        /// Rendering options.
        options: SelectOptions,
        /// Typed value and update closure.
        field: BaseField<V, String>,
    },
    /// File upload; the value is the upload lifecycle state.
    File {
        /// Rendering options.
        options: FileOptions,
        /// Typed value and update closure.
        field: BaseField<V, FileState>,
    },
    /// Date picker.
    DatePicker {
        /// Rendering options.
        options: DatePickerOptions,
        /// Typed value and update closure.
        field: BaseField<V, Option<CalendarDate>>,
    },
    /// User picker; the value is the selected account names.
    UserPicker {
        /// Rendering options.
        options: UserPickerOptions,
        /// Typed value and update closure.
        field: BaseField<V, Vec<String>>,
    },
    /// Structural grouping of already-filled sub-fields, for layout only.
    Group {
        /// Layout options.
        options: GroupOptions,
        /// The wrapped sub-fields, in composition order.
        children: Vec<FilledField<V>>,
    },
    /// Inert decorative content.
    Decoration {
        /// The content payload.
        options: DecorationOptions,
    },
    /// Fully custom interactive content the page wires itself.
    Custom {
        /// Id and widget tag.
        options: CustomOptions,
    },
}

impl<V> FieldState<V> {
    /// The tracking id for this field, if it has one.
    ///
    /// Groups and decorations are never tracked and return `None`.
    pub fn id(&self) -> Option<FieldId> {
        match self {
            FieldState::Text { options, .. } => Some(options.field_id()),
            FieldState::RichText { options, .. } => Some(options.field_id()),
            FieldState::Toggle { options, .. } => Some(options.field_id()),
            FieldState::Checkbox { options, .. } => Some(options.field_id()),
            FieldState::Radio { options, .. } => Some(options.field_id()),
            FieldState::Select { options, .. } => Some(options.field_id()),
            FieldState::File { options, .. } => Some(options.field_id()),
            FieldState::DatePicker { options, .. } => Some(options.field_id()),
            FieldState::UserPicker { options, .. } => Some(options.field_id()),
            FieldState::Group { .. } => None,
            FieldState::Decoration { .. } => None,
            FieldState::Custom { options } => Some(FieldId::new(options.id.clone())),
        }
    }

    /// The kind-specific emptiness predicate.
    ///
    /// Drives the `optional` combinator: an optional sub-form whose fields
    /// are all empty contributes `Ok(None)` no matter what its parsers say.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldState::Text { field, .. } => field.value.trim().is_empty(),
            FieldState::RichText { field, .. } => field.value.trim().is_empty(),
            FieldState::Toggle { field, .. } => !field.value,
            FieldState::Checkbox { field, .. } => !field.value,
            FieldState::Radio { field, .. } => field.value.is_empty(),
            FieldState::Select { field, .. } => field.value.is_empty(),
            FieldState::File { field, .. } => field.value.is_not_asked(),
            FieldState::DatePicker { field, .. } => field.value.is_none(),
            FieldState::UserPicker { field, .. } => field.value.is_empty(),
            FieldState::Group { children, .. } => children.iter().all(|c| c.state.is_empty()),
            FieldState::Decoration { .. } => true,
            FieldState::Custom { .. } => true,
        }
    }

    /// The explicit per-field presentation flags.
    pub fn flags(&self) -> FieldFlags {
        match self {
            FieldState::Text { options, .. } => options.flags,
            FieldState::RichText { options, .. } => options.flags,
            FieldState::Toggle { options, .. } => options.flags,
            FieldState::Checkbox { options, .. } => options.flags,
            FieldState::Radio { options, .. } => options.flags,
            FieldState::Select { options, .. } => options.flags,
            FieldState::File { options, .. } => options.flags,
            FieldState::DatePicker { options, .. } => options.flags,
            FieldState::UserPicker { options, .. } => options.flags,
            FieldState::Group { .. } | FieldState::Decoration { .. } | FieldState::Custom { .. } => {
                FieldFlags::empty()
            }
        }
    }

    /// Re-scope this field from child values `V` to parent values `P`.
    ///
    /// The typed value is already extracted, so only the update closure
    /// needs rewiring: apply against the child read from the parent at apply
    /// time, then write the child back.
    pub fn map_values<P: 'static>(self, lens: &Lens<P, V>) -> FieldState<P>
    where
        V: 'static,
    {
        match self {
            FieldState::Text { options, field } => FieldState::Text {
                options,
                field: map_base(field, lens),
            },
            FieldState::RichText { options, field } => FieldState::RichText {
                options,
                field: map_base(field, lens),
            },
            FieldState::Toggle { options, field } => FieldState::Toggle {
                options,
                field: map_base(field, lens),
            },
            FieldState::Checkbox { options, field } => FieldState::Checkbox {
                options,
                field: map_base(field, lens),
            },
            FieldState::Radio { options, field } => FieldState::Radio {
                options,
                field: map_base(field, lens),
            },
            FieldState::Select { options, field } => FieldState::Select {
                options,
                field: map_base(field, lens),
            },
            FieldState::File { options, field } => FieldState::File {
                options,
                field: map_base(field, lens),
            },
            FieldState::DatePicker { options, field } => FieldState::DatePicker {
                options,
                field: map_base(field, lens),
            },
            FieldState::UserPicker { options, field } => FieldState::UserPicker {
                options,
                field: map_base(field, lens),
            },
            FieldState::Group { options, children } => FieldState::Group {
                options,
                children: children.into_iter().map(|c| c.map_values(lens)).collect(),
            },
            FieldState::Decoration { options } => FieldState::Decoration { options },
            FieldState::Custom { options } => FieldState::Custom { options },
        }
    }
}

impl<V> fmt::Debug for FieldState<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldState::Text { field, .. } => {
                f.debug_struct("Text").field("value", &field.value).finish()
            }
            FieldState::RichText { field, .. } => f
                .debug_struct("RichText")
                .field("value", &field.value)
                .finish(),
            FieldState::Toggle { field, .. } => f
                .debug_struct("Toggle")
                .field("value", &field.value)
                .finish(),
            FieldState::Checkbox { field, .. } => f
                .debug_struct("Checkbox")
                .field("value", &field.value)
                .finish(),
            FieldState::Radio { field, .. } => f
                .debug_struct("Radio")
                .field("value", &field.value)
                .finish(),
            FieldState::Select { field, .. } => f
                .debug_struct("Select")
                .field("value", &field.value)
                .finish(),
            FieldState::File { field, .. } => {
                f.debug_struct("File").field("value", &field.value).finish()
            }
            FieldState::DatePicker { field, .. } => f
                .debug_struct("DatePicker")
                .field("value", &field.value)
                .finish(),
            FieldState::UserPicker { field, .. } => f
                .debug_struct("UserPicker")
                .field("value", &field.value)
                .finish(),
            FieldState::Group { children, .. } => f
                .debug_struct("Group")
                .field("children", &children.len())
                .finish(),
            FieldState::Decoration { .. } => f.debug_struct("Decoration").finish(),
            FieldState::Custom { options } => {
                f.debug_struct("Custom").field("tag", &options.tag).finish()
            }
        }
    }
}

/// Rewire a base field's update closure from child to parent values.
fn map_base<P: 'static, V: 'static, I: 'static>(
    base: BaseField<V, I>,
    lens: &Lens<P, V>,
) -> BaseField<P, I> {
    let BaseField { value, update } = base;
    let get = Rc::clone(&lens.get);
    let set = Rc::clone(&lens.set);
    BaseField {
        value,
        update: Rc::new(move |input, parent| {
            let child = (get)(parent);
            let child = (update)(input, &child);
            (set)(child, parent)
        }),
    }
}

// ============================================================================
// Filled field
// ============================================================================

/// One field evaluated against current dirty values.
///
/// Ephemeral: recomputed on every fill. The error here is the raw parse or
/// external error; whether it is actually displayed is decided later from
/// the validation strategy and the runtime model's tracking state.
#[derive(Debug)]
pub struct FilledField<V> {
    /// The evaluated field.
    pub state: FieldState<V>,
    /// Parse or external error, display-ready.
    pub error: Option<String>,
    /// When the error becomes visible.
    pub strategy: ValidationStrategy,
    /// Whether the surrounding composition requires this field.
    pub is_required: bool,
}

impl<V> FilledField<V> {
    /// Re-scope from child values to parent values. See
    /// [`FieldState::map_values`].
    pub fn map_values<P: 'static>(self, lens: &Lens<P, V>) -> FilledField<P>
    where
        V: 'static,
    {
        FilledField {
            state: self.state.map_values(lens),
            error: self.error,
            strategy: self.strategy,
            is_required: self.is_required,
        }
    }
}

// ============================================================================
// Lens
// ============================================================================

/// A bidirectional accessor re-scoping a sub-form's values type into a
/// larger one.
///
/// `get` extracts the child record from the parent; `set` writes a new child
/// back. Every field inside the nested form keeps working against the child
/// shape while the outer form only ever sees the parent.
pub struct Lens<P, C> {
    pub(crate) get: Rc<dyn Fn(&P) -> C>,
    pub(crate) set: Rc<dyn Fn(C, &P) -> P>,
}

impl<P, C> Lens<P, C> {
    /// Build a lens from a getter/setter pair.
    pub fn new(get: impl Fn(&P) -> C + 'static, set: impl Fn(C, &P) -> P + 'static) -> Self {
        Lens {
            get: Rc::new(get),
            set: Rc::new(set),
        }
    }

    /// Read the child out of the parent.
    pub fn get(&self, parent: &P) -> C {
        (self.get)(parent)
    }

    /// Write a new child into the parent.
    pub fn set(&self, child: C, parent: &P) -> P {
        (self.set)(child, parent)
    }
}

impl<P, C> Clone for Lens<P, C> {
    fn clone(&self) -> Self {
        Lens {
            get: Rc::clone(&self.get),
            set: Rc::clone(&self.set),
        }
    }
}
