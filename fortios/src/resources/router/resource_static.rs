//! fortios_router_static resource implementation
//!
//! FortiOS 7.0.1 replaced the `sdwan` enable/disable switch with the
//! `sdwan-zone` table. Both spellings are in the schema; the firmware
//! version decides which one is sent and read back.

use serde_json::Value;
use tfdata::{AttributeBuilder, ResourceData, Schema, SchemaBuilder};

use crate::api::AttributeMap;
use crate::error::Result;
use crate::resources::common::{
    expand_subtable, provider_attributes, set_field, subtable_attribute, Field, FieldContext,
};
use crate::resources::{compatibility, CmdbObject};
use crate::support::{ip_mask_equivalent, join_ip_mask, reconcile_ip_mask};

/// Logical name of the SD-WAN attribute in the compatibility registry
pub const SDWAN: &str = "router_static.sdwan";

const SEQ_NUM: Field = Field::int("seq_num", "seq-num");

const FIELDS: &[Field] = &[
    SEQ_NUM,
    Field::string("status", "status"),
    Field::string("src", "src"),
    Field::string("gateway", "gateway"),
    Field::int("distance", "distance"),
    Field::int("weight", "weight"),
    Field::int("priority", "priority"),
    Field::string("device", "device"),
    Field::string("comment", "comment"),
    Field::string("blackhole", "blackhole"),
    Field::string("dynamic_gateway", "dynamic-gateway"),
    Field::string("dstaddr", "dstaddr"),
    Field::int("internet_service", "internet-service"),
    Field::string("internet_service_custom", "internet-service-custom"),
    Field::string("link_monitor_exempt", "link-monitor-exempt"),
    Field::int("vrf", "vrf"),
    Field::string("bfd", "bfd"),
];

const SDWAN_ZONE: &[Field] = &[Field::string("name", "name")];

/// Static routes in `router/static`, keyed by sequence number
pub struct RouterStatic;

impl CmdbObject for RouterStatic {
    const TYPE_NAME: &'static str = "fortios_router_static";
    const PATH: &'static str = "router/static";
    const MKEY: Field = SEQ_NUM;

    fn fields() -> &'static [Field] {
        FIELDS
    }

    fn schema() -> Schema {
        let builder = FIELDS.iter().fold(
            SchemaBuilder::new()
                .version(0)
                .description("Configure IPv4 static routing tables"),
            |builder, field| builder.attribute(field.schema_attribute()),
        );

        provider_attributes(
            builder
                .attribute(
                    AttributeBuilder::string("dst")
                        .description("Destination IP and mask for this route")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::string("sdwan")
                        .description("Enable/disable egress through SD-WAN (before 7.0.1)")
                        .optional()
                        .computed()
                        .build(),
                )
                .attribute(subtable_attribute(
                    "sdwan_zone",
                    SDWAN_ZONE,
                    "SD-WAN zone names (7.0.1 and later)",
                )),
        )
        .build()
    }

    fn expand_special(
        d: &dyn ResourceData,
        ctx: &FieldContext,
        obj: &mut AttributeMap,
    ) -> Result<()> {
        if let Some(dst) = d.get_ok("dst") {
            obj.insert("dst".to_string(), dst.clone());
        }

        let Some(spelling) = compatibility().check_configured(SDWAN, &ctx.version, d)? else {
            return Ok(());
        };
        let value = match spelling.attribute {
            "sdwan_zone" => expand_subtable(d, "sdwan_zone", SDWAN_ZONE),
            attribute => d.get_ok(attribute).cloned(),
        };
        if let Some(value) = value {
            obj.insert(spelling.wire_name.to_string(), value);
        }
        Ok(())
    }

    fn flatten_special(
        d: &mut dyn ResourceData,
        obj: &AttributeMap,
        ctx: &FieldContext,
    ) -> Result<()> {
        let raw = obj.get("dst");
        let dst = match raw.and_then(join_ip_mask) {
            Some(reported) => match d.get("dst").and_then(Value::as_str) {
                Some(configured) => Value::String(reconcile_ip_mask(configured, &reported)?),
                None => Value::String(reported),
            },
            None => raw.cloned().unwrap_or(Value::Null),
        };
        set_field(d, "dst", raw, dst)?;

        let spelling = compatibility().spelling_for(SDWAN, &ctx.version)?;
        let raw = obj.get(spelling.wire_name);
        match spelling.attribute {
            "sdwan_zone" => ctx.set_subtable(d, "sdwan_zone", raw, SDWAN_ZONE, "name"),
            attribute => set_field(d, attribute, raw, raw.cloned().unwrap_or(Value::Null)),
        }
    }

    fn suppress_diff(attribute: &str, old: &Value, new: &Value) -> bool {
        match (attribute, old.as_str(), new.as_str()) {
            ("dst", Some(old), Some(new)) => ip_mask_equivalent(old, new),
            _ => false,
        }
    }
}
