/// Keep `candidate` only if it is a local absolute path, otherwise `fallback`.
///
/// Scheme-qualified and protocol-relative targets (`//evil`, `/\evil`) are
/// rejected so the post-login redirect can never leave this origin.
#[must_use]
pub fn sanitize_return_to(candidate: Option<&str>, fallback: &str) -> String {
    match candidate {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => fallback.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    if chars.next() != Some('/') {
        return false;
    }
    if matches!(chars.next(), Some('/' | '\\')) {
        return false;
    }
    !path.chars().any(|c| c == '\\' || c.is_control())
}
