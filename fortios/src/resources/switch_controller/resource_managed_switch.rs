//! fortios_switchcontroller_managedswitch resource implementation

use serde_json::Value;
use tfdata::{ResourceData, Schema, SchemaBuilder};

use crate::api::AttributeMap;
use crate::error::Result;
use crate::resources::common::{
    expand_subtable, provider_attributes, set_field, subtable_attribute, Field, FieldContext,
};
use crate::resources::{compatibility, CmdbObject};

/// Logical name of the PoE detection attribute in the compatibility registry
pub const POE_DETECTION: &str = "switch_controller_managed_switch.poe_detection";

const SWITCH_ID: Field = Field::string("switch_id", "switch-id").required();

const FIELDS: &[Field] = &[
    SWITCH_ID,
    Field::string("name", "name"),
    Field::string("description", "description"),
    Field::string("type", "type"),
    Field::string("owner_vdom", "owner-vdom"),
    Field::string("fsw_wan1_peer", "fsw-wan1-peer"),
    Field::string("fsw_wan1_admin", "fsw-wan1-admin"),
    Field::int("max_allowed_trunk_members", "max-allowed-trunk-members"),
    Field::string("firmware_provision", "firmware-provision"),
];

/// Both spellings of PoE detection; the firmware decides which is live
const POE_SPELLINGS: &[Field] = &[
    Field::string("poe_pre_standard_detection", "poe-pre-standard-detection"),
    Field::int("poe_detection_type", "poe-detection-type"),
];

const PORTS: &[Field] = &[
    Field::string("port_name", "port-name"),
    Field::string("description", "description"),
    Field::string("status", "status"),
    Field::string("speed", "speed"),
    Field::string("vlan", "vlan"),
    Field::string("allowed_vlans_all", "allowed-vlans-all"),
    Field::string("poe_status", "poe-status"),
    Field::string("type", "type"),
    Field::int("port_number", "port-number"),
];

/// FortiSwitches managed by the FortiGate, in `switch-controller/managed-switch`
pub struct SwitchControllerManagedSwitch;

impl SwitchControllerManagedSwitch {
    fn poe_field(attribute: &str) -> Option<&'static Field> {
        POE_SPELLINGS.iter().find(|f| f.attribute == attribute)
    }
}

impl CmdbObject for SwitchControllerManagedSwitch {
    const TYPE_NAME: &'static str = "fortios_switchcontroller_managedswitch";
    const PATH: &'static str = "switch-controller/managed-switch";
    const MKEY: Field = SWITCH_ID;

    fn fields() -> &'static [Field] {
        FIELDS
    }

    fn schema() -> Schema {
        let builder = FIELDS.iter().chain(POE_SPELLINGS).fold(
            SchemaBuilder::new()
                .version(0)
                .description("Configure FortiSwitch devices that are managed by this FortiGate"),
            |builder, field| builder.attribute(field.schema_attribute()),
        );

        provider_attributes(builder.attribute(subtable_attribute(
            "ports",
            PORTS,
            "Managed-switch port list",
        )))
        .build()
    }

    fn expand_special(
        d: &dyn ResourceData,
        ctx: &FieldContext,
        obj: &mut AttributeMap,
    ) -> Result<()> {
        if let Some(spelling) = compatibility().check_configured(POE_DETECTION, &ctx.version, d)? {
            if let Some(value) = d.get_ok(spelling.attribute) {
                obj.insert(spelling.wire_name.to_string(), value.clone());
            }
        }

        if let Some(ports) = expand_subtable(d, "ports", PORTS) {
            obj.insert("ports".to_string(), ports);
        }
        Ok(())
    }

    fn flatten_special(
        d: &mut dyn ResourceData,
        obj: &AttributeMap,
        ctx: &FieldContext,
    ) -> Result<()> {
        let spelling = compatibility().spelling_for(POE_DETECTION, &ctx.version)?;
        if let Some(field) = Self::poe_field(spelling.attribute) {
            let raw = obj.get(field.wire);
            let value = raw.map(|v| field.flatten(v)).unwrap_or(Value::Null);
            set_field(d, field.attribute, raw, value)?;
        }

        ctx.set_subtable(d, "ports", obj.get("ports"), PORTS, "port_name")
    }
}
