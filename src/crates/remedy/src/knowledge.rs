//! Curated disease to treatment lookup.

use std::collections::HashMap;

/// Vetted treatments shipped with the service.
pub const SEED_ENTRIES: &[(&str, &str)] = &[
    ("glaucoma", "Use eye drops such as latanoprost to reduce intraocular pressure."),
    ("anxiety", "Consider SSRIs like sertraline or cognitive behavioral therapy."),
    (
        "lung cancer",
        "Treatment may include surgery, chemotherapy, or targeted therapy depending on the stage.",
    ),
    (
        "diabetes",
        "Manage with insulin therapy, metformin, or lifestyle changes like diet and exercise.",
    ),
    ("hypertension", "Use ACE inhibitors like lisinopril and maintain a low-sodium diet."),
    ("depression", "Consider antidepressants like fluoxetine or psychotherapy."),
    (
        "asthma",
        "Use an inhaler with albuterol for acute symptoms and inhaled corticosteroids for long-term control.",
    ),
    (
        "migraine",
        "Use triptans like sumatriptan for acute attacks and beta-blockers for prevention.",
    ),
    ("arthritis", "Manage with NSAIDs like ibuprofen or physical therapy."),
    (
        "pneumonia",
        "Treat with antibiotics like amoxicillin and ensure adequate rest and hydration.",
    ),
];

/// Read-only treatment table keyed by normalized disease name.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, String>,
}

impl KnowledgeBase {
    /// An empty table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shipped seed entries.
    pub fn seeded() -> Self {
        Self::empty().with_entries(SEED_ENTRIES.iter().copied())
    }

    /// Add entries, replacing existing ones with the same key.
    pub fn with_entries<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (disease, treatment) in entries {
            self.entries.insert(normalize(disease.as_ref()), treatment.into());
        }
        self
    }

    /// Vetted treatment for `disease`, if there is one.
    pub fn lookup(&self, disease: &str) -> Option<&str> {
        self.entries.get(&normalize(disease)).map(String::as_str)
    }

    pub fn contains(&self, disease: &str) -> bool {
        self.lookup(disease).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(disease: &str) -> String {
    disease.trim().to_lowercase()
}
