use std::sync::LazyLock;

use heck::ToTitleCase;
use regex::Regex;

use crate::ir::HttpMethod;

/// Verb + resource split used for block names. A trailing `V<digits>`
/// version marker is dropped from the resource part.
static BLOCK_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(get|list|create|update|delete|search|submit|query|validate|schedule|cancel)(.+?)(?:V\d+)?$",
    )
    .unwrap()
});

/// Narrower verb set used when deriving the resource from an operationId.
static RESOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(get|list|create|update|delete|search)(.+)$").unwrap());

static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());
static QUOTED_DOLLAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`\$([a-zA-Z]+)`").unwrap());
static AT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([a-zA-Z])").unwrap());
static DOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.([a-zA-Z])").unwrap());
static HYPHEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-([a-zA-Z])").unwrap());
static UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_([a-z])").unwrap());

/// Singular/plural path segments mapped to their canonical resource name.
const RESOURCE_SYNONYMS: &[(&str, &str, &str)] = &[
    ("monitor", "monitors", "Monitor"),
    ("event", "events", "Event"),
    ("metric", "metrics", "Metric"),
    ("log", "logs", "Log"),
    ("dashboard", "dashboards", "Dashboard"),
    ("user", "users", "User"),
    ("host", "hosts", "Host"),
    ("tag", "tags", "Tag"),
    ("downtime", "downtimes", "Downtime"),
    ("synthetic", "synthetics", "Synthetic"),
    ("slo", "slos", "SLO"),
    ("incident", "incidents", "Incident"),
];

const IGNORED_SEGMENTS: &[&str] = &["api", "v1", "v2"];

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert an external parameter or property name to a camelCase identifier.
///
/// - `filter[query]` → `filterQuery`
/// - `` `$op` `` → `Op`, then lower-first → `op`
/// - `@resource_id` → `ResourceId` → `resourceId`
/// - `version.first` → `versionFirst`
/// - `Content-Encoding` → `contentEncoding`
/// - `monitor_id` → `monitorId`
pub fn parameter_to_camel_case(name: &str) -> String {
    let s = BRACKET_RE.replace_all(name, |caps: &regex::Captures| capitalize_first(&caps[1]));
    let s = QUOTED_DOLLAR_RE.replace_all(&s, |caps: &regex::Captures| capitalize_first(&caps[1]));
    let s = AT_RE.replace_all(&s, |caps: &regex::Captures| caps[1].to_uppercase());
    let s = DOT_RE.replace_all(&s, |caps: &regex::Captures| caps[1].to_uppercase());
    let s = HYPHEN_RE.replace_all(&s, |caps: &regex::Captures| caps[1].to_uppercase());
    let s = UNDERSCORE_RE.replace_all(&s, |caps: &regex::Captures| caps[1].to_uppercase());
    lower_first(&s)
}

/// Human label for a field name: `monitor_id` → `Monitor Id`.
pub fn humanize_field_name(name: &str) -> String {
    name.to_title_case()
}

/// Split an identifier into space-separated words, keeping acronyms intact:
/// `getMonitor` → `Get Monitor`, `SLOCorrection` → `SLO Correction`.
pub fn humanize_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 && ch.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push(' ');
            }
        }
        out.push(ch);
    }
    capitalize_first(out.trim())
}

/// Collapse newlines to spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ").trim().to_string()
}

/// Canonical resource name: synonyms table, otherwise first letter capitalized.
pub fn normalize_resource_name(name: &str) -> String {
    let lower = name.to_lowercase();
    RESOURCE_SYNONYMS
        .iter()
        .find(|(singular, plural, _)| lower == *singular || lower == *plural)
        .map(|(_, _, canonical)| canonical.to_string())
        .unwrap_or_else(|| capitalize_first(name))
}

/// Naive singularization with the synonym table taking priority.
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some((singular, _, _)) = RESOURCE_SYNONYMS.iter().find(|(_, p, _)| lower == *p) {
        return singular.to_string();
    }
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Resource name for an operation: operationId verb split, then the first
/// meaningful path segment, then the first tag, then `Resource`.
pub fn resource_name(operation_id: Option<&str>, path: &str, tags: &[String]) -> String {
    if let Some(caps) = operation_id.and_then(|id| RESOURCE_RE.captures(id)) {
        return capitalize_first(&caps[2]);
    }

    let segment = path
        .split('/')
        .filter(|s| !s.is_empty() && !s.starts_with('{'))
        .find(|s| !IGNORED_SEGMENTS.contains(&s.to_lowercase().as_str()));
    if let Some(segment) = segment {
        let lower = segment.to_lowercase();
        if let Some((_, _, canonical)) = RESOURCE_SYNONYMS
            .iter()
            .find(|(singular, plural, _)| lower == *singular || lower == *plural)
        {
            return canonical.to_string();
        }
        return capitalize_first(&singularize(segment));
    }

    if let Some(tag) = tags.first() {
        return capitalize_first(tag);
    }

    "Resource".to_string()
}

/// Verb for a method when no operationId split is available.
pub fn action_for(method: HttpMethod, single_item: bool) -> &'static str {
    match method {
        HttpMethod::Get if single_item => "Get",
        HttpMethod::Get => "List",
        HttpMethod::Post => "Create",
        HttpMethod::Put | HttpMethod::Patch => "Update",
        HttpMethod::Delete => "Delete",
    }
}

/// Whether the path ends in an identifier-like placeholder
/// (`{..._id}`, `{...Id}`, `{...Name}`).
pub fn has_identifier_placeholder(path: &str) -> bool {
    path.contains('{')
        && (path.contains("_id}") || path.contains("Id}") || path.contains("Name}"))
}

/// PascalCase block identifier.
pub fn block_name(
    operation_id: Option<&str>,
    method: HttpMethod,
    path: &str,
    resource: &str,
) -> String {
    if let Some(id) = operation_id {
        if let Some(caps) = BLOCK_NAME_RE.captures(id) {
            return format!("{}{}", capitalize_first(&caps[1]), capitalize_first(&caps[2]));
        }
        return capitalize_first(id);
    }
    let action = action_for(method, has_identifier_placeholder(path));
    format!("{action}{}", normalize_resource_name(resource))
}

/// Display text derived from an operationId: `getMonitor` → `Get Monitor`.
pub fn operation_id_display_name(operation_id: &str) -> String {
    match BLOCK_NAME_RE.captures(operation_id) {
        Some(caps) => format!("{} {}", capitalize_first(&caps[1]), humanize_text(&caps[2])),
        None => humanize_text(operation_id),
    }
}
