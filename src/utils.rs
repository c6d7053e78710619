use actix_web::dev::ServiceRequest;
use actix_web::rt::task::JoinHandle;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

pub fn fmt_json<T: Serialize>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    write!(f, "{}", json)
}

pub fn get_header_value(req: &ServiceRequest, header_name: &str) -> Option<String> {
    req.headers()
        .get(header_name)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.to_string())
}

/// Runs a blocking closure on the blocking pool while keeping the caller's span.
pub fn spawn_blocking_with_tracing<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let current_span = tracing::Span::current();
    actix_web::rt::task::spawn_blocking(move || current_span.in_scope(f))
}

/// Turns a free-form name or link into a URL-safe slug.
///
/// Lowercases, drops the first scheme prefix, keeps `[a-z0-9- ]`, turns
/// whitespace runs into `-` and keeps at most 80 characters.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let without_scheme = match (lowered.find("https://"), lowered.find("http://")) {
        (Some(a), Some(b)) if b < a => remove_range(&lowered, b, "http://".len()),
        (Some(a), _) => remove_range(&lowered, a, "https://".len()),
        (None, Some(b)) => remove_range(&lowered, b, "http://".len()),
        (None, None) => lowered,
    };
    let filtered: String = without_scheme
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == ' ')
        .collect();
    let mut slug = String::with_capacity(filtered.len());
    let mut in_space = false;
    for c in filtered.chars() {
        if c == ' ' {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    slug.truncate(80);
    slug
}

fn remove_range(value: &str, start: usize, len: usize) -> String {
    let mut out = String::with_capacity(value.len());
    out.push_str(&value[..start]);
    out.push_str(&value[start + len..]);
    out
}

/// Slug used when the name-derived one is already taken.
pub fn slug_with_suffix(slug: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let base: String = slug.chars().take(80 - 7).collect();
    format!("{}-{}", base.trim_end_matches('-'), &suffix[..6])
}
