use std::fmt::Write;

use super::{EntityKind, RelationKind, DISEASE_GROUPS};

/// Attribute explanations the model needs to map question wording onto properties
const ATTRIBUTE_HINTS: &[(&str, &str)] = &[
    ("品种名称", "该小麦的具体名称，一般提问中给出的中文名称均指该属性"),
    ("库编号", "小麦在作物库中的编号，唯一"),
    ("统一编号", "小麦的统一编号，唯一"),
    ("保存单位", "小麦存储的单位"),
    ("原产地", "详细地理位置"),
    ("省", "原产地所在省份，值中不含“省”字，查询语句中要删去“省”"),
    ("东经", "原产地对应东经值"),
    ("北纬", "原产地对应北纬值"),
    ("种类", "包括中国和国外，用以区分是我国品种还是引进品种"),
    ("病害名称", "病害的具体名称"),
];

fn entity_caption(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Wheat => "小麦",
        EntityKind::Region => "地区",
        EntityKind::Disease => "病虫害",
    }
}

fn relation_caption(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::GrowsIn => "作物种植于地区",
        RelationKind::AffectedBy => "作物受病虫害影响",
    }
}

fn hint(attribute: &str) -> Option<&'static str> {
    ATTRIBUTE_HINTS
        .iter()
        .find(|(name, _)| *name == attribute)
        .map(|(_, hint)| *hint)
}

/// Textual description of the schema used to ground the question prompt,
/// generated from the registry tables
pub fn describe() -> String {
    let mut out = String::from("知识图谱结构：\n- 实体类型：\n");

    for kind in EntityKind::ALL {
        let attributes: Vec<String> = kind
            .attributes()
            .iter()
            .map(|attribute| match hint(attribute) {
                Some(h) => format!("\"{attribute}\"（{h}）"),
                None => format!("\"{attribute}\""),
            })
            .collect();
        let _ = writeln!(
            out,
            "  - {}（{}）：属性有 {}",
            kind.label(),
            entity_caption(kind),
            attributes.join("、")
        );
    }

    out.push_str("- 关系类型：\n");
    for kind in RelationKind::ALL {
        let _ = writeln!(
            out,
            "  - {rel}：{src} -[:{rel}]-> {dst}（{caption}）",
            rel = kind.rel_type(),
            src = kind.source().label(),
            dst = kind.target().label(),
            caption = relation_caption(kind),
        );
    }

    let _ = writeln!(out, "  {} 关系上的属性按病害划分：", RelationKind::AffectedBy.rel_type());
    for group in &DISEASE_GROUPS {
        let attributes: Vec<String> = group
            .attributes
            .iter()
            .map(|a| format!("\"{a}\""))
            .collect();
        let _ = writeln!(
            out,
            "    {}关联的属性有：{}",
            group.disease.name(),
            attributes.join(", ")
        );
    }
    out.push_str(
        "  （如果问题问的是某种作物对某种病害的程度、病害的属性，则查询该作物与该病害的[AFFECTED_BY]关系的属性，注意不是病害节点的属性）\n",
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{disease_relationship_attributes, WHEAT_ATTRIBUTES};

    #[test]
    fn test_mentions_every_declared_name() {
        let text = describe();

        for kind in EntityKind::ALL {
            assert!(text.contains(kind.label()));
        }
        for kind in RelationKind::ALL {
            assert!(text.contains(kind.rel_type()));
        }
        for attribute in WHEAT_ATTRIBUTES.iter().copied().chain(disease_relationship_attributes()) {
            assert!(text.contains(&format!("\"{attribute}\"")), "{attribute} missing");
        }
        assert!(text.contains("根腐病关联的属性有"));
    }

    #[test]
    fn test_province_hint_present() {
        assert!(describe().contains("要删去“省”"));
    }
}
