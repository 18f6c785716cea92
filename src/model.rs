//! Job and parameter data carried through a reservation.
//!
//! Trimmed to what scheduling, firing, and display need. The scheduler treats
//! a [`JobModel`] as read-only: it is cloned into a reservation at schedule
//! time and never mutated afterwards.

/// Reference to a job on the remote server.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JobModel {
    pub name: String,
    pub url: String,
    pub full_name: String,
    pub full_display_name: Option<String>,
    pub buildable: bool,
}

impl JobModel {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            url: url.into(),
            full_display_name: None,
            buildable: true,
        }
    }

    /// Name to show in user-facing messages.
    pub fn display_name(&self) -> &str {
        self.full_display_name.as_deref().unwrap_or(&self.name)
    }
}

impl std::fmt::Display for JobModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Insertion-ordered `name -> value` parameter snapshot, captured when a
/// reservation is created.
///
/// `set` replaces an existing value in place, so iteration always follows
/// first-insertion order. The scheduler never modifies a captured snapshot.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter, keeping its original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for FormParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}
