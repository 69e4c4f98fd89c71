use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

/// Handlebars registry with the helpers the panel templates use.
///
/// Strict mode is on so a misspelled field fails loudly instead of rendering
/// an empty attribute. HTML escaping stays on: usernames and server messages
/// are untrusted.
pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);

    handlebars_helper!(exists: |v: Value| {
        match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    });
    handlebars.register_helper("exists", Box::new(exists));

    handlebars_helper!(stringeq: |s1: String, s2: String| s1.eq(&s2));
    handlebars.register_helper("stringeq", Box::new(stringeq));

    handlebars
}
