use std::collections::HashSet;

/// Block identifiers claimed so far across every schema source of a run.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `<base><version>`, appending `1`, `2`, ... until it is unused.
    pub fn claim(&mut self, base: &str, version: &str) -> String {
        let versioned = format!("{base}{version}");
        let mut candidate = versioned.clone();
        let mut counter = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{versioned}{counter}");
            counter += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
