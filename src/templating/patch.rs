//! Key/value patching of Java property files.
//!
//! A patch rewrites the value of every non-comment line whose key matches,
//! leaving all other lines (comments, blank lines, unrelated keys, line
//! endings) byte-for-byte intact. Setting a value is idempotent: applying
//! the same patch twice produces the same text as applying it once.

/// An ordered set of `key = value` assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPatch {
    entries: Vec<(String, String)>,
}

/// Result of applying a patch to some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    pub text: String,
    pub report: PatchReport,
}

/// Which keys were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Keys present in the file, in patch order.
    pub matched: Vec<String>,
    /// Keys with no matching line, in patch order.
    pub missing: Vec<String>,
    /// Whether the patched text differs from the input.
    pub changed: bool,
}

impl PatchReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl PropertyPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment. A later assignment to the same key wins.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn value_for(&self, key: &str) -> Option<(usize, &str)> {
        self.entries
            .iter()
            .position(|(k, _)| k == key)
            .map(|i| (i, self.entries[i].1.as_str()))
    }

    /// Apply the patch to the full text of a property file.
    pub fn apply(&self, text: &str) -> PatchResult {
        let mut found = vec![false; self.entries.len()];
        let mut out = String::with_capacity(text.len() + 64);

        for line in text.split_inclusive('\n') {
            let (body, ending) = split_line_ending(line);
            match property_key(body).and_then(|key| self.value_for(key).map(|v| (key, v))) {
                Some((key, (index, value))) => {
                    found[index] = true;
                    let indent = &body[..body.len() - body.trim_start().len()];
                    out.push_str(indent);
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                    out.push_str(ending);
                }
                None => out.push_str(line),
            }
        }

        let mut report = PatchReport::default();
        for ((key, _), hit) in self.entries.iter().zip(found) {
            if hit {
                report.matched.push(key.clone());
            } else {
                report.missing.push(key.clone());
            }
        }
        report.changed = out != text;

        PatchResult { text: out, report }
    }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Key of a `key=value` or `key:value` line; `None` for comments, blanks
/// and lines without a separator.
fn property_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
        return None;
    }
    let sep = trimmed.find(['=', ':'])?;
    let key = trimmed[..sep].trim_end();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_empty_value() {
        let patch = PropertyPatch::new().set("config.client_id", "abc123");
        let result = patch.apply("config.client_id=\n");
        assert_eq!(result.text, "config.client_id=abc123\n");
        assert_eq!(result.report.matched, vec!["config.client_id"]);
        assert!(result.report.changed);
    }

    #[test]
    fn reapplying_does_not_duplicate_value() {
        let patch = PropertyPatch::new().set("config.client_id", "abc123");
        let once = patch.apply("config.client_id=\n");
        let twice = patch.apply(&once.text);
        assert_eq!(twice.text, "config.client_id=abc123\n");
        assert!(!twice.report.changed);
        assert!(twice.report.is_complete());
    }

    #[test]
    fn replaces_existing_value_and_keeps_other_lines() {
        let input = "# OAuth settings\r\n\
                     config.client_id = old\r\n\
                     config.other=keep\r\n\
                     \r\n\
                     #config.client_id=commented";
        let patch = PropertyPatch::new().set("config.client_id", "new");
        let result = patch.apply(input);
        assert_eq!(
            result.text,
            "# OAuth settings\r\n\
             config.client_id=new\r\n\
             config.other=keep\r\n\
             \r\n\
             #config.client_id=commented"
        );
    }

    #[test]
    fn value_may_contain_separators() {
        let patch = PropertyPatch::new()
            .set("database.url", "jdbc:mysql://db:3306/RSS")
            .set("database.username", "rss");
        let result = patch.apply(
            "database.url=jdbc:mysql://localhost:3306/RSS\ndatabase.username=root\n",
        );
        assert_eq!(
            result.text,
            "database.url=jdbc:mysql://db:3306/RSS\ndatabase.username=rss\n"
        );
    }

    #[test]
    fn reports_missing_keys() {
        let patch = PropertyPatch::new()
            .set("config.client_id", "a")
            .set("config.callbackURL", "b");
        let result = patch.apply("config.client_id=\n");
        assert_eq!(result.report.missing, vec!["config.callbackURL"]);
        assert!(!result.report.is_complete());
    }

    #[test]
    fn key_must_match_exactly() {
        let patch = PropertyPatch::new().set("config.client", "x");
        let result = patch.apply("config.client_id=\n");
        assert_eq!(result.text, "config.client_id=\n");
        assert_eq!(result.report.missing, vec!["config.client"]);
    }

    #[test]
    fn later_set_wins() {
        let patch = PropertyPatch::new().set("k", "1").set("k", "2");
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.apply("k=\n").text, "k=2\n");
    }
}
