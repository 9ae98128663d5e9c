//! Signup form demo driving the full protocol without a UI toolkit.
//!
//! Builds a small signup form, renders its projection as plain text, and
//! scripts a user session: a premature submit that reveals errors, typing
//! through the projected event constructors, a simulated file upload, and
//! a final successful submit.

use formkit::validators;
use formkit::*;

#[derive(Clone, Debug)]
struct Values {
    username: String,
    avatar: FileState,
    accepted: bool,
}

#[derive(Debug)]
struct Account {
    username: String,
    avatar_url: String,
}

fn signup_form() -> Form<Values, Account> {
    Form::succeed(())
        .with(Form::text(
            TextOptions::new("Username").with_placeholder("e.g. alice42"),
            FieldConfig::new(
                |v: &Values| v.username.clone(),
                |username, v: &Values| Values {
                    username,
                    ..v.clone()
                },
                |raw: &String| {
                    validators::validate(raw)
                        .required("Please enter a username")
                        .min_length(3, "At least 3 characters")
                        .finish()
                        .map(|()| raw.clone())
                },
            ),
        ))
        .with(Form::file(
            FileOptions::new("Avatar"),
            FieldConfig::new(
                |v: &Values| v.avatar.clone(),
                |avatar, v: &Values| Values {
                    avatar,
                    ..v.clone()
                },
                |state: &FileState| match state.url() {
                    Some(url) => Ok(url.to_string()),
                    None => Err("Please upload an avatar".to_string()),
                },
            ),
        ))
        .with(Form::checkbox(
            CheckboxOptions::new("Accept terms"),
            FieldConfig::new(
                |v: &Values| v.accepted,
                |accepted, v: &Values| Values {
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
        ))
        .map(|(((_, username), avatar_url), ())| Account {
            username,
            avatar_url,
        })
}

fn render(projected: &FormView<Values>) {
    for field in &projected.fields {
        let label = match &field.widget {
            Widget::Text { options, value, .. } => format!("{}: {:?}", options.label, value),
            Widget::File { options, state, .. } => format!("{}: {:?}", options.label, state),
            Widget::Checkbox { options, value, .. } => format!("{}: {}", options.label, value),
            _ => continue,
        };
        match &field.error {
            Some(error) => println!("  {label}  <- {error}"),
            None => println!("  {label}"),
        }
    }
    println!(
        "  [submit{}]",
        if projected.submit_blocked { " blocked" } else { "" }
    );
}

/// Run the commands a page would: pretend the upload transport succeeds.
fn run_commands(model: &mut Model<Values>, commands: Vec<Command<Values>>) {
    for command in commands {
        match command {
            Command::UploadFile {
                field,
                generation,
                file,
                apply,
            } => {
                println!("(uploading {}...)", file.name);
                model.update(Msg::CompletedFileUpload {
                    field,
                    generation,
                    result: Ok(format!("https://cdn.example/{}", file.name)),
                    apply,
                });
            }
            Command::Focus(field) => println!("(focusing `{field}`)"),
            Command::Notify(text) => println!("(notification: {text})"),
        }
    }
}

fn main() {
    let form = signup_form();
    let mut model = Model::new(Values {
        username: String::new(),
        avatar: FileState::NotAsked,
        accepted: false,
    });

    println!("Initial form (errors hidden until blur or submit):");
    render(&view(&form, &model));

    println!("\nSubmitting too early:");
    if let SubmitOutcome::Invalid(msg) = model.submit(&form) {
        let commands = model.update(msg);
        run_commands(&mut model, commands);
    }
    render(&view(&form, &model));

    println!("\nFilling the form in:");
    let projected = view(&form, &model);
    for field in &projected.fields {
        match &field.widget {
            Widget::Text { on_change, .. } => {
                let commands = model.update(on_change("alice42".to_string()));
                run_commands(&mut model, commands);
            }
            Widget::File { on_select, .. } => {
                let commands = model.update(on_select(FilePayload::new("alice.png")));
                run_commands(&mut model, commands);
            }
            Widget::Checkbox { on_change, .. } => {
                let commands = model.update(on_change(true));
                run_commands(&mut model, commands);
            }
            _ => {}
        }
    }
    render(&view(&form, &model));

    println!("\nSubmitting again:");
    match model.submit(&form) {
        SubmitOutcome::Valid(account) => println!("Created {account:?}"),
        other => println!("Unexpected outcome: {other:?}"),
    }
}
