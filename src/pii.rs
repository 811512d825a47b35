/// Masks an email for log output: first character, `***`, then everything
/// from the final `@` on. Strings where that pattern cannot apply (no `@`,
/// or `@` in first position) pass through unchanged.
pub fn mask_email(email: &str) -> String {
    let Some(at) = email.rfind('@') else {
        return email.to_string();
    };
    let Some(first) = email.chars().next() else {
        return email.to_string();
    };
    if at < first.len_utf8() {
        return email.to_string();
    }
    format!("{first}***{}", &email[at..])
}
