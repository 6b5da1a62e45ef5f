//! fortios_firewall_addrgrp resource implementation

use tfdata::{ResourceData, Schema, SchemaBuilder};

use crate::api::AttributeMap;
use crate::error::Result;
use crate::resources::common::{
    expand_subtable, provider_attributes, subtable_attribute, Field, FieldContext,
};
use crate::resources::CmdbObject;

const NAME: Field = Field::string("name", "name").required();

const FIELDS: &[Field] = &[
    NAME,
    Field::string("type", "type"),
    Field::string("category", "category"),
    Field::string("uuid", "uuid"),
    Field::string("comment", "comment"),
    Field::string("exclude", "exclude"),
    Field::int("color", "color"),
    Field::string("allow_routing", "allow-routing"),
    Field::string("fabric_object", "fabric-object"),
];

const MEMBER: &[Field] = &[Field::string("name", "name")];

const TAGGING: &[Field] = &[
    Field::string("name", "name"),
    Field::string("category", "category"),
];

/// Subtables of an address group, keyed by `name`
const SUBTABLES: &[(&str, &str, &[Field], &str)] = &[
    ("member", "member", MEMBER, "Address objects contained within the group"),
    ("exclude_member", "exclude-member", MEMBER, "Address exclusion member"),
    ("tagging", "tagging", TAGGING, "Config object tagging"),
];

/// Address groups in `firewall/addrgrp`
pub struct FirewallAddrgrp;

impl CmdbObject for FirewallAddrgrp {
    const TYPE_NAME: &'static str = "fortios_firewall_addrgrp";
    const PATH: &'static str = "firewall/addrgrp";
    const MKEY: Field = NAME;

    fn fields() -> &'static [Field] {
        FIELDS
    }

    fn schema() -> Schema {
        let builder = FIELDS.iter().fold(
            SchemaBuilder::new()
                .version(0)
                .description("Configure IPv4 address groups"),
            |builder, field| builder.attribute(field.schema_attribute()),
        );

        let builder = SUBTABLES
            .iter()
            .fold(builder, |builder, (attribute, _, columns, description)| {
                builder.attribute(subtable_attribute(attribute, columns, description))
            });

        provider_attributes(builder).build()
    }

    fn expand_special(
        d: &dyn ResourceData,
        _ctx: &FieldContext,
        obj: &mut AttributeMap,
    ) -> Result<()> {
        for (attribute, wire, columns, _) in SUBTABLES {
            if let Some(rows) = expand_subtable(d, attribute, columns) {
                obj.insert(wire.to_string(), rows);
            }
        }
        Ok(())
    }

    fn flatten_special(
        d: &mut dyn ResourceData,
        obj: &AttributeMap,
        ctx: &FieldContext,
    ) -> Result<()> {
        for (attribute, wire, columns, _) in SUBTABLES {
            ctx.set_subtable(d, attribute, obj.get(*wire), columns, "name")?;
        }
        Ok(())
    }
}
