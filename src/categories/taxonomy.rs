//! Taxonomy registry
//!
//! Every supported classification scheme is a [`Taxonomy`] variant. Each
//! one knows its identifier (also its column name in extended tables),
//! the mutation types it applies to, how to label a mutation, and its
//! fixed canonical label list.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::{dbs, indel, sbs};
use crate::core::{ClassifyResult, MutationContext, MutationType};

/// A fixed, versioned category scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Taxonomy {
    Sbs6,
    Sbs12,
    Sbs96,
    Sbs192,
    Sbs1536,
    Dbs10,
    Dbs78,
    IndelAlexandrov16,
    IndelAlexandrov83,
    IndelHaradhvala8,
}

const SBS: &[MutationType] = &[MutationType::Sbs];
const DBS: &[MutationType] = &[MutationType::Dbs];
const INDEL: &[MutationType] = &[MutationType::Ins, MutationType::Del];

impl Taxonomy {
    /// Every supported taxonomy
    pub const ALL: [Taxonomy; 10] = [
        Taxonomy::Sbs6,
        Taxonomy::Sbs12,
        Taxonomy::Sbs96,
        Taxonomy::Sbs192,
        Taxonomy::Sbs1536,
        Taxonomy::Dbs10,
        Taxonomy::Dbs78,
        Taxonomy::IndelAlexandrov16,
        Taxonomy::IndelAlexandrov83,
        Taxonomy::IndelHaradhvala8,
    ];

    /// Taxonomies added by extension when none are requested
    pub const DEFAULT: [Taxonomy; 3] = [
        Taxonomy::IndelAlexandrov83,
        Taxonomy::Dbs78,
        Taxonomy::Sbs96,
    ];

    /// Identifier, also used as the category column name
    pub fn id(&self) -> &'static str {
        match self {
            Taxonomy::Sbs6 => "SBS_6",
            Taxonomy::Sbs12 => "SBS_12",
            Taxonomy::Sbs96 => "SBS_96",
            Taxonomy::Sbs192 => "SBS_192",
            Taxonomy::Sbs1536 => "SBS_1536",
            Taxonomy::Dbs10 => "DBS_10",
            Taxonomy::Dbs78 => "DBS_78",
            Taxonomy::IndelAlexandrov16 => "INDEL_Alexandrov2018_16",
            Taxonomy::IndelAlexandrov83 => "INDEL_Alexandrov2018_83",
            Taxonomy::IndelHaradhvala8 => "INDEL_Haradhvala2018_8",
        }
    }

    /// Look up a taxonomy by identifier
    ///
    /// # Examples
    /// ```
    /// use mutation_context::categories::Taxonomy;
    ///
    /// assert_eq!(Taxonomy::from_id("SBS_96"), Some(Taxonomy::Sbs96));
    /// assert_eq!(Taxonomy::from_id("SBS_97"), None);
    /// ```
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id.trim())
    }

    /// Mutation types this taxonomy classifies
    pub fn applicable_types(&self) -> &'static [MutationType] {
        match self {
            Taxonomy::Sbs6 | Taxonomy::Sbs12 | Taxonomy::Sbs96 | Taxonomy::Sbs192 | Taxonomy::Sbs1536 => SBS,
            Taxonomy::Dbs10 | Taxonomy::Dbs78 => DBS,
            Taxonomy::IndelAlexandrov16 | Taxonomy::IndelAlexandrov83 | Taxonomy::IndelHaradhvala8 => INDEL,
        }
    }

    pub fn applies_to(&self, mutation_type: MutationType) -> bool {
        self.applicable_types().contains(&mutation_type)
    }

    /// Label one mutation
    ///
    /// `Ok(None)` is a missing value (a stranded taxonomy without a
    /// definite transcription strand). Errors are per-row failures.
    /// Applicability to the mutation type is the caller's concern.
    pub fn classify(&self, context: &MutationContext<'_>) -> ClassifyResult<Option<String>> {
        let id = self.id();
        match self {
            Taxonomy::Sbs6 => sbs::context_label(context, 0, id).map(Some),
            Taxonomy::Sbs12 => sbs::stranded_label(context, id),
            Taxonomy::Sbs96 => sbs::context_label(context, 1, id).map(Some),
            Taxonomy::Sbs192 => sbs::stranded_context_label(context, id),
            Taxonomy::Sbs1536 => sbs::context_label(context, 2, id).map(Some),
            Taxonomy::Dbs10 => dbs::reference_label(context, id).map(Some),
            Taxonomy::Dbs78 => dbs::substitution_label(context, id).map(Some),
            Taxonomy::IndelAlexandrov16 => {
                indel::alexandrov_labels(context, id).map(|l| Some(l.category))
            }
            Taxonomy::IndelAlexandrov83 => {
                indel::alexandrov_labels(context, id).map(|l| Some(l.subcategory))
            }
            Taxonomy::IndelHaradhvala8 => indel::haradhvala_label(context, id).map(Some),
        }
    }

    /// The fixed, ordered list of every valid label
    ///
    /// Built on first use and shared for the life of the process.
    pub fn canonical_labels(&self) -> &'static [String] {
        static SBS_6: OnceLock<Vec<String>> = OnceLock::new();
        static SBS_12: OnceLock<Vec<String>> = OnceLock::new();
        static SBS_96: OnceLock<Vec<String>> = OnceLock::new();
        static SBS_192: OnceLock<Vec<String>> = OnceLock::new();
        static SBS_1536: OnceLock<Vec<String>> = OnceLock::new();
        static DBS_10: OnceLock<Vec<String>> = OnceLock::new();
        static DBS_78: OnceLock<Vec<String>> = OnceLock::new();
        static INDEL_16: OnceLock<Vec<String>> = OnceLock::new();
        static INDEL_83: OnceLock<Vec<String>> = OnceLock::new();
        static INDEL_8: OnceLock<Vec<String>> = OnceLock::new();

        match self {
            Taxonomy::Sbs6 => SBS_6.get_or_init(|| sbs::context_labels(0)),
            Taxonomy::Sbs12 => SBS_12.get_or_init(sbs::stranded_labels),
            Taxonomy::Sbs96 => SBS_96.get_or_init(|| sbs::context_labels(1)),
            Taxonomy::Sbs192 => SBS_192.get_or_init(sbs::stranded_context_labels),
            Taxonomy::Sbs1536 => SBS_1536.get_or_init(|| sbs::context_labels(2)),
            Taxonomy::Dbs10 => DBS_10.get_or_init(dbs::reference_labels),
            Taxonomy::Dbs78 => DBS_78.get_or_init(dbs::substitution_labels),
            Taxonomy::IndelAlexandrov16 => INDEL_16.get_or_init(indel::alexandrov_category_labels),
            Taxonomy::IndelAlexandrov83 => INDEL_83.get_or_init(indel::alexandrov_subcategory_labels),
            Taxonomy::IndelHaradhvala8 => INDEL_8.get_or_init(indel::haradhvala_labels),
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Taxonomy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Taxonomy::from_id(s).ok_or_else(|| {
            let known: Vec<&str> = Taxonomy::ALL.iter().map(|t| t.id()).collect();
            format!("unknown taxonomy '{}' (expected one of: {})", s, known.join(", "))
        })
    }
}
