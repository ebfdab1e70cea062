/// Form-encoded body decoding
///
/// The frontend posts `application/x-www-form-urlencoded` bodies with
/// bracketed field names, e.g. `data[name]`, `data[email]`, and repeated
/// `data[labels][]` entries for multi-selects. Repeated keys rule out a
/// plain struct deserialize, so bodies are decoded into key/value pairs
/// and read by name.
///
/// # Example
///
/// ```
/// use taskboard_web::forms::FormData;
///
/// let form = FormData::parse(b"data[name]=Fix+login&data[labels][]=1&data[labels][]=2").unwrap();
/// assert_eq!(form.field("name"), Some("Fix login"));
/// assert_eq!(form.id_list("labels"), vec![1, 2]);
/// ```

use crate::error::AppError;

/// Decoded form body, preserving repeated keys
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Decodes a form-urlencoded body
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the body isn't valid
    /// form-urlencoded data.
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid form body: {}", e)))?;

        Ok(Self { pairs })
    }

    /// Gets the first value for an exact key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a `data[...]` field by its inner name
    ///
    /// Falls back to the bare name so hand-written clients work too.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.get(&format!("data[{}]", name)).or_else(|| self.get(name))
    }

    /// Gets a field with surrounding whitespace trimmed
    ///
    /// A missing field reads as empty, which is what the validators expect.
    pub fn trimmed(&self, name: &str) -> String {
        self.field(name).unwrap_or_default().trim().to_string()
    }

    /// Whether a `data[...]` field was submitted at all
    ///
    /// Distinguishes "left untouched" from "set to empty" for PATCH
    /// semantics.
    pub fn has_field(&self, name: &str) -> bool {
        let bracketed = format!("data[{}]", name);
        let repeated = format!("data[{}][]", name);
        self.pairs
            .iter()
            .any(|(k, _)| *k == bracketed || *k == repeated || k == name)
    }

    /// Collects all values for a repeated `data[...][]` field
    pub fn many(&self, name: &str) -> Vec<&str> {
        let repeated = format!("data[{}][]", name);
        let bracketed = format!("data[{}]", name);
        self.pairs
            .iter()
            .filter(|(k, _)| *k == repeated || *k == bracketed)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Parses a repeated field as a list of ids, skipping blanks
    pub fn id_list(&self, name: &str) -> Vec<i64> {
        self.many(name)
            .into_iter()
            .filter_map(|v| v.trim().parse::<i64>().ok())
            .collect()
    }

    /// Parses a single field as an id; empty reads as None
    pub fn id_field(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(|v| v.trim().parse::<i64>().ok())
    }
}
