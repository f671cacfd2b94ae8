use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// An optional default is supported via `{{ env.VAR | default("value") }}`;
/// when the variable is unset the default is substituted instead of
/// failing. Comment lines are passed through untouched so commented-out
/// secrets never block startup.
pub fn expand_env(input: &str) -> Result<String, String> {
    expand_with(input, |name| std::env::var(name).ok())
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, String> {
    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;
        for captures in placeholder_re().captures_iter(line) {
            let overall = captures.get(0).expect("match exists");
            let var_name = captures.get(1).expect("group 1 exists").as_str();
            let default_value = captures.get(2).map(|m| m.as_str());

            output.push_str(&line[last_end..overall.start()]);

            match lookup(var_name).as_deref().or(default_value) {
                Some(value) => output.push_str(value),
                None => return Err(format!("environment variable not found: `{var_name}`")),
            }

            last_end = overall.end();
        }
        output.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}
