//! Integration tests for formkit
//!
//! These tests drive complete forms through the model/view protocol the way
//! a page would: project the view, fire the projected event constructors,
//! feed the resulting messages back through the model, and submit.

use std::rc::Rc;

use formkit::validators;
use formkit::*;

#[derive(Clone, Debug, PartialEq)]
struct Signup {
    username: String,
    bio: String,
    plan: String,
    avatar: FileState,
    accepted: bool,
}

impl Signup {
    fn empty() -> Self {
        Signup {
            username: String::new(),
            bio: String::new(),
            plan: String::new(),
            avatar: FileState::NotAsked,
            accepted: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Account {
    username: String,
    bio: Option<String>,
    plan: String,
    avatar_url: String,
}

fn username_field() -> Form<Signup, String> {
    Form::text(
        TextOptions::new("Username").with_max_length(20),
        FieldConfig::new(
            |v: &Signup| v.username.clone(),
            |username, v: &Signup| Signup {
                username,
                ..v.clone()
            },
            |raw: &String| {
                validators::validate(raw)
                    .required("Please enter a username")
                    .min_length(3, "At least 3 characters")
                    .alphanumeric("Letters and digits only")
                    .finish()
                    .map(|()| raw.clone())
            },
        ),
    )
}

fn bio_field() -> Form<Signup, String> {
    Form::text(
        TextOptions::new("Bio"),
        FieldConfig::new(
            |v: &Signup| v.bio.clone(),
            |bio, v: &Signup| Signup { bio, ..v.clone() },
            validators::non_empty("Please enter a bio"),
        ),
    )
}

fn plan_field() -> Form<Signup, String> {
    Form::select(
        SelectOptions::new(
            "Plan",
            vec![
                ("free".to_string(), "Free".to_string()),
                ("pro".to_string(), "Pro".to_string()),
            ],
        ),
        FieldConfig::new(
            |v: &Signup| v.plan.clone(),
            |plan, v: &Signup| Signup { plan, ..v.clone() },
            |raw: &String| {
                if raw.is_empty() {
                    Err("Please pick a plan".to_string())
                } else {
                    Ok(raw.clone())
                }
            },
        ),
    )
}

fn avatar_field() -> Form<Signup, String> {
    Form::file(
        FileOptions::new("Avatar").with_max_bytes(2_000_000),
        FieldConfig::new(
            |v: &Signup| v.avatar.clone(),
            |avatar, v: &Signup| Signup {
                avatar,
                ..v.clone()
            },
            |state: &FileState| match state.url() {
                Some(url) => Ok(url.to_string()),
                None => Err("Please upload an avatar".to_string()),
            },
        ),
    )
}

fn terms_field() -> Form<Signup, ()> {
    Form::checkbox(
        CheckboxOptions::new("Accept terms"),
        FieldConfig::new(
            |v: &Signup| v.accepted,
            |accepted, v: &Signup| Signup {
                accepted,
                ..v.clone()
            },
            |accepted: &bool| {
                if *accepted {
                    Ok(())
                } else {
                    Err("You must accept the terms".to_string())
                }
            },
        ),
    )
}

fn signup_form() -> Form<Signup, Account> {
    Form::succeed(())
        .with(username_field())
        .with(bio_field().optional())
        .with(plan_field())
        .with(avatar_field())
        .with(terms_field())
        .map(|(((((_, username), bio), plan), avatar_url), ())| Account {
            username,
            bio,
            plan,
            avatar_url,
        })
}

fn complete_values() -> Signup {
    Signup {
        username: "alice42".into(),
        bio: String::new(),
        plan: "pro".into(),
        avatar: FileState::Loaded("https://cdn/alice.png".into()),
        accepted: true,
    }
}

fn error_fields<O>(filled: &FilledForm<Signup, O>) -> Vec<String> {
    filled
        .result
        .errors()
        .map(|set| set.iter().map(|e| e.field.to_string()).collect())
        .unwrap_or_default()
}

/// Composing the same fields under different groupings yields the same
/// tracked fields and the same set of errors.
#[test]
fn test_composition_grouping_is_immaterial() {
    let flat = Form::succeed(())
        .with(username_field())
        .with(plan_field())
        .with(terms_field());
    let grouped: Form<Signup, ((), ((String, String), ()))> = Form::succeed(()).with(Form::group(
        GroupOptions::new(),
        Form::succeed(())
            .with(username_field())
            .with(plan_field())
            .map(|((_, u), p)| (u, p)),
        terms_field(),
        |up, t| (up, t),
    ));

    let values = Signup::empty();
    let flat_filled = flat.fill(&values);
    let grouped_filled = grouped.fill(&values);

    assert_eq!(flat_filled.tracked_ids(), grouped_filled.tracked_ids());

    let mut flat_errors = error_fields(&flat_filled);
    let mut grouped_errors = error_fields(&grouped_filled);
    flat_errors.sort();
    grouped_errors.sort();
    assert_eq!(flat_errors, grouped_errors);
}

/// The first error always belongs to the earliest composed failing field,
/// regardless of how many fields fail after it.
#[test]
fn test_first_error_is_earliest_composed() {
    let form = signup_form();
    let mut values = Signup::empty();
    values.username = "alice42".into();

    // Username valid, bio optional and empty: the plan is the earliest
    // failing field.
    let filled = form.fill(&values);
    let errors = filled.result.errors().unwrap();
    assert_eq!(errors.first().field.as_str(), "plan");
    assert_eq!(
        error_fields(&filled),
        vec!["plan".to_string(), "avatar".to_string(), "accept-terms".to_string()]
    );
}

/// An optional section whose fields are all empty is `Ok(None)` even though
/// its parser rejects the empty value; one keystroke re-arms validation.
#[test]
fn test_optional_emptiness_laws() {
    let form = bio_field().optional();

    let filled = form.fill(&Signup::empty());
    assert_eq!(filled.result, FillResult::Ok(None));
    assert!(!filled.fields[0].is_required);

    let mut values = Signup::empty();
    values.bio = "hello".into();
    let filled = form.fill(&values);
    assert_eq!(filled.result, FillResult::Ok(Some("hello".to_string())));
    assert!(filled.fields[0].is_required);

    // Whitespace-only still counts as empty for text fields.
    values.bio = "   ".into();
    let filled = form.fill(&values);
    assert_eq!(filled.result, FillResult::Ok(None));
}

/// Typing through a projected widget updates the values; the next
/// projection reflects the new value.
#[test]
fn test_change_messages_round_trip() {
    let form = username_field();
    let mut model = Model::new(Signup::empty());

    let projected = view(&form, &model);
    let on_change = match &projected.fields[0].widget {
        Widget::Text { on_change, .. } => Rc::clone(on_change),
        _ => panic!("expected text widget"),
    };
    model.update(on_change("alice42".to_string()));

    let projected = view(&form, &model);
    match &projected.fields[0].widget {
        Widget::Text { value, .. } => assert_eq!(value, "alice42"),
        _ => panic!("expected text widget"),
    }
    assert!(!projected.fields[0].has_error);
}

/// Errors stay hidden until the field is blurred; blurring a valid field
/// re-hides a previously revealed error.
#[test]
fn test_blur_controls_error_visibility() {
    let form = username_field();
    let mut model = Model::new(Signup::empty());

    let projected = view(&form, &model);
    assert!(projected.fields[0].error.is_none());
    let blur = match &projected.fields[0].widget {
        Widget::Text { on_blur, .. } => on_blur.clone(),
        _ => panic!("expected text widget"),
    };
    model.update(blur);

    let projected = view(&form, &model);
    assert_eq!(
        projected.fields[0].error.as_deref(),
        Some("Please enter a username")
    );

    // Fix the field and blur again: the error disappears.
    let on_change = match &projected.fields[0].widget {
        Widget::Text { on_change, .. } => Rc::clone(on_change),
        _ => panic!("expected text widget"),
    };
    model.update(on_change("alice42".to_string()));
    let projected = view(&form, &model);
    let blur = match &projected.fields[0].widget {
        Widget::Text { on_blur, .. } => on_blur.clone(),
        _ => panic!("expected text widget"),
    };
    model.update(blur);
    let projected = view(&form, &model);
    assert!(projected.fields[0].error.is_none());
}

/// A failed submit reveals every error at once, overriding both blur state
/// and on-submit strategies, and asks for focus on the first failing field.
#[test]
fn test_failed_submit_reveals_everything() {
    let form = signup_form().validate_with(ValidationStrategy::OnSubmit);
    let mut model = Model::new(Signup::empty());

    let msg = match model.submit(&form) {
        SubmitOutcome::Invalid(msg) => msg,
        other => panic!("expected invalid, got {:?}", other),
    };
    let commands = model.update(msg);
    assert!(matches!(
        &commands[..],
        [Command::Focus(field)] if field.as_str() == "username"
    ));

    let projected = view(&form, &model);
    let errored: Vec<&FieldView<Signup>> = projected
        .fields
        .iter()
        .filter(|f| f.error.is_some())
        .collect();
    // Username, plan, avatar and terms all show; the empty optional bio
    // does not.
    assert_eq!(errored.len(), 4);
}

/// Uploads flow through the command channel: request, loading, completion;
/// edits made while the upload is in flight are not lost.
#[test]
fn test_upload_does_not_lose_concurrent_edits() {
    let form = signup_form();
    let mut model = Model::new(Signup::empty());

    let projected = view(&form, &model);
    let on_select = projected
        .fields
        .iter()
        .find_map(|f| match &f.widget {
            Widget::File { on_select, .. } => Some(Rc::clone(on_select)),
            _ => None,
        })
        .expect("avatar widget");

    let commands = model.update(on_select(FilePayload::new("me.png")));
    let (generation, apply) = match commands.into_iter().next() {
        Some(Command::UploadFile {
            generation, apply, ..
        }) => (generation, apply),
        other => panic!("expected upload command, got {:?}", other),
    };
    assert_eq!(model.values().avatar, FileState::Loading);

    // The user keeps typing while the transport works.
    let projected = view(&form, &model);
    let on_change = projected
        .fields
        .iter()
        .find_map(|f| match &f.widget {
            Widget::Text { options, on_change, .. } if options.label == "Username" => {
                Some(Rc::clone(on_change))
            }
            _ => None,
        })
        .expect("username widget");
    model.update(on_change("alice42".to_string()));

    model.update(Msg::CompletedFileUpload {
        field: FieldId::new("avatar"),
        generation,
        result: Ok("https://cdn/alice.png".into()),
        apply,
    });

    assert_eq!(model.values().username, "alice42");
    assert_eq!(
        model.values().avatar,
        FileState::Loaded("https://cdn/alice.png".into())
    );
}

/// Re-picking a file supersedes the in-flight upload: the stale completion
/// is discarded and the newer one settles the field.
#[test]
fn test_superseded_upload_is_discarded() {
    let mut model = Model::new(Signup::empty());
    let apply: Rc<dyn Fn(FileState, &Signup) -> Signup> = Rc::new(|state, v: &Signup| Signup {
        avatar: state,
        ..v.clone()
    });
    let field = FieldId::new("avatar");

    for name in ["first.png", "second.png"] {
        model.update(Msg::RequestedFileUpload {
            field: field.clone(),
            file: FilePayload::new(name),
            apply: Rc::clone(&apply),
        });
    }

    model.update(Msg::CompletedFileUpload {
        field: field.clone(),
        generation: 1,
        result: Ok("https://cdn/first.png".into()),
        apply: Rc::clone(&apply),
    });
    assert_eq!(model.values().avatar, FileState::Loading);
    assert!(model.has_fields_loading());

    model.update(Msg::CompletedFileUpload {
        field,
        generation: 2,
        result: Ok("https://cdn/second.png".into()),
        apply,
    });
    assert_eq!(
        model.values().avatar,
        FileState::Loaded("https://cdn/second.png".into())
    );
    assert!(!model.has_fields_loading());
}

/// Submission is blocked while an upload is in flight, and unblocks once it
/// completes.
#[test]
fn test_loading_blocks_submit() {
    let form = signup_form();
    let mut model = Model::new(complete_values());
    let apply: Rc<dyn Fn(FileState, &Signup) -> Signup> = Rc::new(|state, v: &Signup| Signup {
        avatar: state,
        ..v.clone()
    });

    model.update(Msg::RequestedFileUpload {
        field: FieldId::new("avatar"),
        file: FilePayload::new("new.png"),
        apply: Rc::clone(&apply),
    });
    assert!(matches!(model.submit(&form), SubmitOutcome::Blocked));
    assert!(view(&form, &model).submit_blocked);

    model.update(Msg::CompletedFileUpload {
        field: FieldId::new("avatar"),
        generation: 1,
        result: Ok("https://cdn/new.png".into()),
        apply,
    });
    assert!(matches!(model.submit(&form), SubmitOutcome::Valid(_)));
}

/// A form nested behind a lens reads and writes through the parent record.
#[test]
fn test_nested_form_round_trip() {
    #[derive(Clone, Debug)]
    struct Page {
        signup: Signup,
        step: u8,
    }

    let lens: Lens<Page, Signup> = Lens::new(
        |p: &Page| p.signup.clone(),
        |signup, p: &Page| Page {
            signup,
            step: p.step,
        },
    );
    let form: Form<Page, String> = username_field().nested(lens);
    let mut model = Model::new(Page {
        signup: Signup::empty(),
        step: 2,
    });

    let projected = view(&form, &model);
    let on_change = match &projected.fields[0].widget {
        Widget::Text { on_change, .. } => Rc::clone(on_change),
        _ => panic!("expected text widget"),
    };
    model.update(on_change("alice42".to_string()));

    assert_eq!(model.values().signup.username, "alice42");
    assert_eq!(model.values().step, 2);
    match model.submit(&form) {
        SubmitOutcome::Valid(username) => assert_eq!(username, "alice42"),
        other => panic!("expected valid, got {:?}", other),
    }
}

/// Full scenario: a user fills the whole signup form through the protocol
/// and ends with a clean output.
#[test]
fn test_full_signup_scenario() {
    let form = signup_form();
    let mut model = Model::new(Signup::empty());

    // First submit attempt fails and reveals errors.
    let msg = match model.submit(&form) {
        SubmitOutcome::Invalid(msg) => msg,
        other => panic!("expected invalid, got {:?}", other),
    };
    model.update(msg);

    // Fill everything in through one programmatic bulk update.
    model.update(Msg::UpdatedValues {
        field: None,
        updater: Rc::new(|v: &Signup| Signup {
            username: "alice42".into(),
            plan: "pro".into(),
            accepted: true,
            ..v.clone()
        }),
    });

    // Upload the avatar.
    let apply: Rc<dyn Fn(FileState, &Signup) -> Signup> = Rc::new(|state, v: &Signup| Signup {
        avatar: state,
        ..v.clone()
    });
    model.update(Msg::RequestedFileUpload {
        field: FieldId::new("avatar"),
        file: FilePayload::new("alice.png"),
        apply: Rc::clone(&apply),
    });
    model.update(Msg::CompletedFileUpload {
        field: FieldId::new("avatar"),
        generation: 1,
        result: Ok("https://cdn/alice.png".into()),
        apply,
    });

    // No lingering errors in the projection, submit succeeds.
    let projected = view(&form, &model);
    assert!(projected.fields.iter().all(|f| f.error.is_none()));
    match model.submit(&form) {
        SubmitOutcome::Valid(account) => {
            assert_eq!(
                account,
                Account {
                    username: "alice42".into(),
                    bio: None,
                    plan: "pro".into(),
                    avatar_url: "https://cdn/alice.png".into(),
                }
            );
        }
        other => panic!("expected valid, got {:?}", other),
    }
}
