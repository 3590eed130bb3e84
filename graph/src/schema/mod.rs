//! Closed schema of the germplasm graph: entity types, relationship types and the
//! attribute vocabularies the ingestion pipeline and the question prompt rely on.

pub mod describe;
pub mod disease;

pub use describe::describe;
pub use disease::{Disease, DiseaseGroup, DISEASE_GROUPS};

use std::fmt;

pub const WHEAT_KEY: &str = "库编号";
pub const REGION_KEY: &str = "原产地";
pub const DISEASE_KEY: &str = "病害名称";

pub const WHEAT_ATTRIBUTES: &[&str] = &[
    "库编号",
    "统一编号",
    "保存单位",
    "品种名称",
    "译名",
    "科名",
    "属名",
    "学名",
    "系谱",
    "育成年限",
    "芒",
    "壳色",
    "粒色",
    "冬春性",
    "成熟期",
    "穗粒数",
    "穗长",
    "株高",
    "千粒重",
    "粗蛋白",
    "赖氨酸",
    "沉淀值",
    "硬度",
    "容重",
    "抗旱性",
    "耐涝性",
    "芽期耐盐",
    "苗期耐盐",
    "田间抗寒性",
    "人工抗寒性",
    "其它",
];

pub const REGION_ATTRIBUTES: &[&str] = &["原产地", "省", "东经", "北纬", "种类"];

pub const DISEASE_ATTRIBUTES: &[&str] = &["病害名称"];

/// Node labels of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Wheat,
    Region,
    Disease,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Wheat, EntityKind::Region, EntityKind::Disease];

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Wheat => "Wheat",
            EntityKind::Region => "Region",
            EntityKind::Disease => "Disease",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    pub fn key_attribute(&self) -> &'static str {
        match self {
            EntityKind::Wheat => WHEAT_KEY,
            EntityKind::Region => REGION_KEY,
            EntityKind::Disease => DISEASE_KEY,
        }
    }

    pub fn attributes(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Wheat => WHEAT_ATTRIBUTES,
            EntityKind::Region => REGION_ATTRIBUTES,
            EntityKind::Disease => DISEASE_ATTRIBUTES,
        }
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes().contains(&attribute)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relationship types of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Wheat grown in a Region, no attributes
    GrowsIn,
    /// Wheat affected by a Disease, carrying the accession's phenotype data
    AffectedBy,
}

impl RelationKind {
    pub const ALL: [RelationKind; 2] = [RelationKind::GrowsIn, RelationKind::AffectedBy];

    pub fn rel_type(&self) -> &'static str {
        match self {
            RelationKind::GrowsIn => "GROWS_IN",
            RelationKind::AffectedBy => "AFFECTED_BY",
        }
    }

    pub fn source(&self) -> EntityKind {
        EntityKind::Wheat
    }

    pub fn target(&self) -> EntityKind {
        match self {
            RelationKind::GrowsIn => EntityKind::Region,
            RelationKind::AffectedBy => EntityKind::Disease,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rel_type())
    }
}

/// Every column that carries disease phenotype data, in source order
pub fn disease_relationship_attributes() -> impl Iterator<Item = &'static str> {
    DISEASE_GROUPS.iter().flat_map(|group| group.attributes.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_declared_attribute() {
        for kind in EntityKind::ALL {
            assert!(kind.has_attribute(kind.key_attribute()), "{kind}");
        }
    }

    #[test]
    fn test_column_sets_are_disjoint() {
        let disease_columns: Vec<&str> = disease_relationship_attributes().collect();
        for column in WHEAT_ATTRIBUTES.iter().chain(REGION_ATTRIBUTES) {
            assert!(!disease_columns.contains(column), "{column} declared twice");
        }
        for column in WHEAT_ATTRIBUTES {
            assert!(!REGION_ATTRIBUTES.contains(column), "{column} declared twice");
        }
        assert_eq!(disease_columns.len(), 18);
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!(EntityKind::from_label("Region"), Some(EntityKind::Region));
        assert_eq!(EntityKind::from_label("region"), None);
        assert_eq!(RelationKind::GrowsIn.target(), EntityKind::Region);
    }
}
