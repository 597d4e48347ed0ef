use indexmap::IndexMap;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::error::GeneratorError;
use crate::generator::GeneratedBlock;

#[derive(Serialize)]
struct ReportEntry<'a> {
    name: &'a str,
    method: &'a str,
    path: &'a str,
    category: &'a str,
}

#[derive(Serialize)]
struct ReportGroup<'a> {
    name: &'a str,
    blocks: Vec<ReportEntry<'a>>,
}

fn entry(block: &GeneratedBlock) -> ReportEntry<'_> {
    ReportEntry {
        name: &block.name,
        method: block.http_method.as_str(),
        path: &block.path,
        category: &block.category,
    }
}

/// Groups in first-seen order.
fn group_by<'a>(
    blocks: &'a [GeneratedBlock],
    key: impl Fn(&'a GeneratedBlock) -> &'a str,
) -> Vec<ReportGroup<'a>> {
    let mut groups: IndexMap<&str, Vec<ReportEntry<'a>>> = IndexMap::new();
    for block in blocks {
        groups.entry(key(block)).or_default().push(entry(block));
    }
    groups
        .into_iter()
        .map(|(name, blocks)| ReportGroup { name, blocks })
        .collect()
}

/// Emit `generation-report.md`: counts grouped by category and by HTTP method.
pub fn emit_report(
    env: &Environment<'_>,
    blocks: &[GeneratedBlock],
) -> Result<String, GeneratorError> {
    let tmpl = env.get_template("generation-report.md.j2")?;
    Ok(tmpl.render(context! {
        total => blocks.len(),
        categories => group_by(blocks, |b| b.category.as_str()),
        methods => group_by(blocks, |b| b.http_method.as_str()),
        blocks => blocks.iter().map(entry).collect::<Vec<_>>(),
    })?)
}
