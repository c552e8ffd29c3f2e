//! Block type catalog: which capability and plan each block type needs, and
//! the structural schema its content must satisfy.

use crate::capability::CapabilityKey;
use crate::plan::PlanTier;
use crate::schema::{Field, Schema};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockTypeSpec {
    pub type_key: &'static str,
    pub capability: CapabilityKey,
    pub minimum_plan: PlanTier,
    pub schema: Schema,
}

impl BlockTypeSpec {
    /// Registry feature key that override rules use to gate this block type.
    pub fn feature_key(&self) -> String {
        format!("block.{}", self.type_key)
    }
}

#[derive(Debug, Clone)]
pub struct BlockCatalog {
    specs: Vec<BlockTypeSpec>,
}

impl Default for BlockCatalog {
    fn default() -> Self {
        Self::new(default_block_types())
    }
}

impl BlockCatalog {
    pub fn new(specs: Vec<BlockTypeSpec>) -> Self {
        Self { specs }
    }

    pub fn get(&self, type_key: &str) -> Option<&BlockTypeSpec> {
        self.specs.iter().find(|spec| spec.type_key == type_key)
    }

    pub fn type_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|spec| spec.type_key)
    }
}

fn editor_block(type_key: &'static str, schema: Schema) -> BlockTypeSpec {
    BlockTypeSpec {
        type_key,
        capability: CapabilityKey::BlockEditor,
        minimum_plan: PlanTier::Basic,
        schema,
    }
}

fn default_block_types() -> Vec<BlockTypeSpec> {
    vec![
        editor_block(
            "text",
            Schema::object(vec![Field::required("body", Schema::string(1, 20_000))]),
        ),
        editor_block(
            "heading",
            Schema::object(vec![
                Field::required("text", Schema::string(1, 300)),
                Field::required("level", Schema::integer(Some(1), Some(6))),
            ]),
        ),
        editor_block(
            "image",
            Schema::object(vec![
                Field::required("url", Schema::string(1, 2_048)),
                Field::optional("alt", Schema::string(0, 500)),
            ]),
        ),
        editor_block(
            "list",
            Schema::object(vec![Field::required(
                "items",
                Schema::array(Schema::string(1, 2_000), 1, 200),
            )]),
        ),
        BlockTypeSpec {
            type_key: "quote",
            capability: CapabilityKey::StorytellingBlocks,
            minimum_plan: PlanTier::Pro,
            schema: Schema::object(vec![
                Field::required("text", Schema::string(1, 2_000)),
                Field::optional("attribution", Schema::string(0, 300)),
            ]),
        },
        BlockTypeSpec {
            type_key: "timeline",
            capability: CapabilityKey::StorytellingBlocks,
            minimum_plan: PlanTier::Pro,
            schema: Schema::object(vec![Field::required(
                "entries",
                Schema::array(
                    Schema::object(vec![
                        Field::required("date", Schema::string(1, 64)),
                        Field::required("title", Schema::string(1, 300)),
                        Field::optional("description", Schema::string(0, 5_000)),
                    ]),
                    1,
                    100,
                ),
            )]),
        },
        BlockTypeSpec {
            type_key: "quiz",
            capability: CapabilityKey::InteractionBlocks,
            minimum_plan: PlanTier::Premium,
            schema: Schema::object(vec![
                Field::required("question", Schema::string(1, 1_000)),
                Field::required("options", Schema::array(Schema::string(1, 500), 2, 10)),
                Field::required("answer_index", Schema::integer(Some(0), None)),
            ]),
        },
        BlockTypeSpec {
            type_key: "accordion",
            capability: CapabilityKey::InteractionBlocks,
            minimum_plan: PlanTier::Premium,
            schema: Schema::object(vec![Field::required(
                "sections",
                Schema::array(
                    Schema::object(vec![
                        Field::required("title", Schema::string(1, 300)),
                        Field::required("body", Schema::string(1, 20_000)),
                    ]),
                    1,
                    50,
                ),
            )]),
        },
    ]
}

/// Schema shared by block-level and document-level styling.
pub fn styling_schema() -> Schema {
    Schema::strict_object(vec![
        Field::optional("font_family", Schema::one_of(&["sans", "serif", "mono"])),
        Field::optional("text_color", Schema::prefixed("#", 4, 32)),
        Field::optional("background_color", Schema::prefixed("#", 4, 32)),
        Field::optional("font_size", Schema::integer(Some(8), Some(72))),
        Field::optional("alignment", Schema::one_of(&["left", "center", "right"])),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_gated_types_line_up_with_capabilities() {
        let catalog = BlockCatalog::default();
        let quiz = catalog.get("quiz").unwrap();
        assert_eq!(quiz.capability, CapabilityKey::InteractionBlocks);
        assert_eq!(quiz.minimum_plan, PlanTier::Premium);
        assert_eq!(quiz.feature_key(), "block.quiz");

        let timeline = catalog.get("timeline").unwrap();
        assert_eq!(timeline.capability, CapabilityKey::StorytellingBlocks);
        assert_eq!(timeline.minimum_plan, PlanTier::Pro);

        assert!(catalog.get("carousel").is_none());
    }

    #[test]
    fn type_keys_are_unique() {
        let catalog = BlockCatalog::default();
        let mut keys: Vec<_> = catalog.type_keys().collect();
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }
}
