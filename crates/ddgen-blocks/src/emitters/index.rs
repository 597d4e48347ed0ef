use minijinja::{Environment, context};

use crate::error::GeneratorError;

/// Emit `index.ts` re-exporting every block under its identifier.
pub fn emit_index(env: &Environment<'_>, names: &[&str]) -> Result<String, GeneratorError> {
    let tmpl = env.get_template("index.ts.j2")?;
    Ok(tmpl.render(context! {
        total => names.len(),
        names => names,
    })?)
}
