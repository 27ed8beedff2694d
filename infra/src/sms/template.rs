//! Message templates with `{name}` placeholders

use std::collections::HashMap;

use cg_core::TemplateArgs;

/// Message bodies keyed by template id
#[derive(Debug, Clone, Default)]
pub struct Templates {
    bodies: HashMap<String, String>,
}

impl Templates {
    pub fn new(bodies: HashMap<String, String>) -> Self {
        Self { bodies }
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.bodies.contains_key(template_id)
    }

    /// Render `template_id`, or `None` if it is not registered
    pub fn render(&self, template_id: &str, args: &TemplateArgs) -> Option<String> {
        self.bodies.get(template_id).map(|body| render(body, args))
    }

    /// Render `template_id`, falling back to a plain listing of the
    /// arguments for unknown templates
    pub fn render_or_describe(&self, template_id: &str, args: &TemplateArgs) -> String {
        self.render(template_id, args).unwrap_or_else(|| {
            let mut pairs: Vec<_> = args.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            pairs.sort();
            format!("[{}] {}", template_id, pairs.join(" "))
        })
    }
}

/// Replace every `{name}` in `body` with `args[name]`.
/// Placeholders without an argument are kept verbatim.
pub fn render(body: &str, args: &TemplateArgs) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match args.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
