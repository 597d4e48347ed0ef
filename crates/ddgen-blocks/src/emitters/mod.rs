pub mod block;
pub mod index;
pub mod manifest;
pub mod report;

use minijinja::Environment;

use crate::error::GeneratorError;
use crate::type_mapper::{js_string, template_text};

/// Template environment shared by all emitters.
pub fn environment() -> Result<Environment<'static>, GeneratorError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_filter("js_string", js_string);
    env.add_filter("template_text", template_text);
    env.add_template("block.ts.j2", include_str!("../../templates/block.ts.j2"))?;
    env.add_template("index.ts.j2", include_str!("../../templates/index.ts.j2"))?;
    env.add_template(
        "generation-report.md.j2",
        include_str!("../../templates/generation-report.md.j2"),
    )?;
    Ok(env)
}
