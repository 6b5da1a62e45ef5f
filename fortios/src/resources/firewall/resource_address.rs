//! fortios_firewall_address resource implementation

use serde_json::Value;
use tfdata::{AttributeBuilder, ResourceData, Schema, SchemaBuilder};

use crate::api::AttributeMap;
use crate::error::Result;
use crate::resources::common::{
    expand_subtable, provider_attributes, set_field, subtable_attribute, Field, FieldContext,
};
use crate::resources::CmdbObject;
use crate::support::{ip_mask_equivalent, join_ip_mask, reconcile_ip_mask};

const NAME: Field = Field::string("name", "name").required();

const FIELDS: &[Field] = &[
    NAME,
    Field::string("uuid", "uuid"),
    Field::string("type", "type"),
    Field::string("start_ip", "start-ip"),
    Field::string("end_ip", "end-ip"),
    Field::string("fqdn", "fqdn"),
    Field::string("country", "country"),
    Field::string("wildcard", "wildcard"),
    Field::string("comment", "comment"),
    Field::string("associated_interface", "associated-interface"),
    Field::int("color", "color"),
    Field::string("allow_routing", "allow-routing"),
    Field::string("fabric_object", "fabric-object"),
];

const TAGGING: &[Field] = &[
    Field::string("name", "name"),
    Field::string("category", "category"),
];

/// Address objects in `firewall/address`
pub struct FirewallAddress;

impl CmdbObject for FirewallAddress {
    const TYPE_NAME: &'static str = "fortios_firewall_address";
    const PATH: &'static str = "firewall/address";
    const MKEY: Field = NAME;

    fn fields() -> &'static [Field] {
        FIELDS
    }

    fn schema() -> Schema {
        let builder = FIELDS.iter().fold(
            SchemaBuilder::new()
                .version(0)
                .description("Configure IPv4 addresses"),
            |builder, field| builder.attribute(field.schema_attribute()),
        );

        provider_attributes(
            builder
                .attribute(
                    AttributeBuilder::string("subnet")
                        .description("IP address and subnet mask of address")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(subtable_attribute("tagging", TAGGING, "Config object tagging")),
        )
        .build()
    }

    fn expand_special(
        d: &dyn ResourceData,
        _ctx: &FieldContext,
        obj: &mut AttributeMap,
    ) -> Result<()> {
        if let Some(subnet) = d.get_ok("subnet") {
            obj.insert("subnet".to_string(), subnet.clone());
        }
        if let Some(tagging) = expand_subtable(d, "tagging", TAGGING) {
            obj.insert("tagging".to_string(), tagging);
        }
        Ok(())
    }

    fn flatten_special(
        d: &mut dyn ResourceData,
        obj: &AttributeMap,
        ctx: &FieldContext,
    ) -> Result<()> {
        let raw = obj.get("subnet");
        let subnet = match raw.and_then(join_ip_mask) {
            Some(reported) => match d.get("subnet").and_then(Value::as_str) {
                Some(configured) => Value::String(reconcile_ip_mask(configured, &reported)?),
                None => Value::String(reported),
            },
            None => raw.cloned().unwrap_or(Value::Null),
        };
        set_field(d, "subnet", raw, subnet)?;

        ctx.set_subtable(d, "tagging", obj.get("tagging"), TAGGING, "name")
    }

    fn suppress_diff(attribute: &str, old: &Value, new: &Value) -> bool {
        match (attribute, old.as_str(), new.as_str()) {
            ("subnet", Some(old), Some(new)) => ip_mask_equivalent(old, new),
            _ => false,
        }
    }
}
