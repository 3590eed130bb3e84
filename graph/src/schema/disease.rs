use std::fmt;

/// The fixed disease vocabulary. Disease nodes carry only their name; the
/// accession-specific phenotype data lives on AFFECTED_BY edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Disease {
    StripeRust,
    LeafRust,
    StemRust,
    PowderyMildew,
    YellowDwarf,
    HeadBlight,
    RootRot,
}

impl Disease {
    pub const ALL: [Disease; 7] = [
        Disease::StripeRust,
        Disease::LeafRust,
        Disease::StemRust,
        Disease::PowderyMildew,
        Disease::YellowDwarf,
        Disease::HeadBlight,
        Disease::RootRot,
    ];

    /// Canonical node name, the value of `病害名称`
    pub fn name(&self) -> &'static str {
        match self {
            Disease::StripeRust => "条锈病",
            Disease::LeafRust => "叶锈病",
            Disease::StemRust => "秆锈病",
            Disease::PowderyMildew => "白粉病",
            Disease::YellowDwarf => "黄矮病",
            Disease::HeadBlight => "赤霉病",
            Disease::RootRot => "根腐病",
        }
    }

    /// Resolve a column prefix through the explicit group table
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        DISEASE_GROUPS
            .iter()
            .find(|group| group.prefix == prefix)
            .map(|group| group.disease)
    }

    /// `DISEASE_GROUPS` is laid out in declaration order of this enum
    pub fn group(&self) -> &'static DiseaseGroup {
        &DISEASE_GROUPS[*self as usize]
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns sharing a two-character prefix, and the disease they describe
#[derive(Debug)]
pub struct DiseaseGroup {
    pub prefix: &'static str,
    pub disease: Disease,
    pub attributes: &'static [&'static str],
}

pub static DISEASE_GROUPS: [DiseaseGroup; 7] = [
    DiseaseGroup {
        prefix: "条锈",
        disease: Disease::StripeRust,
        attributes: &["条锈严重度", "条锈反应型", "条锈普遍率"],
    },
    DiseaseGroup {
        prefix: "叶锈",
        disease: Disease::LeafRust,
        attributes: &["叶锈严重度", "叶锈反应型", "叶锈普遍率"],
    },
    DiseaseGroup {
        prefix: "秆锈",
        disease: Disease::StemRust,
        attributes: &["秆锈严重度", "秆锈反应型", "秆锈普遍率"],
    },
    DiseaseGroup {
        prefix: "白粉",
        disease: Disease::PowderyMildew,
        attributes: &["白粉严重度", "白粉反应型"],
    },
    DiseaseGroup {
        prefix: "黄矮",
        disease: Disease::YellowDwarf,
        attributes: &["黄矮病"],
    },
    DiseaseGroup {
        prefix: "赤霉",
        disease: Disease::HeadBlight,
        attributes: &["赤霉病病穗", "赤霉病病指", "赤霉病指数", "赤霉病抗性"],
    },
    DiseaseGroup {
        prefix: "根腐",
        disease: Disease::RootRot,
        attributes: &["根腐叶病级", "根腐穗病级"],
    },
];

/// First two characters of a column name. Characters, not bytes: every prefix
/// in the vocabulary is CJK.
pub fn column_prefix(column: &str) -> String {
    column.chars().take(2).collect()
}
