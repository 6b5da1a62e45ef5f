//! Resource implementations

pub mod common;
pub mod firewall;
pub mod router;
pub mod switch_controller;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::marker::PhantomData;
use std::sync::OnceLock;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tfdata::{ResourceData, Schema};

use crate::api::{ApiError, AttributeMap};
use crate::error::{FortiosError, Result};
use crate::provider_data::FortiosProviderData;
use crate::support::{FieldCompatibility, FieldSpelling, Range};
use common::{
    expand_fields, flatten_fields, forti_string_value, vdom_param, Field, FieldContext,
    DYNAMIC_SORT_SUBTABLE, GET_ALL_TABLES, VDOMPARAM,
};

pub use firewall::{FirewallAddress, FirewallAddrgrp};
pub use router::RouterStatic;
pub use switch_controller::SwitchControllerManagedSwitch;

/// A Terraform resource type backed by the FortiOS API
#[async_trait]
pub trait FortiResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, d: &mut dyn ResourceData) -> Result<()>;

    /// Refresh state from the API. Clears the id when the object is gone
    async fn read(&self, d: &mut dyn ResourceData) -> Result<()>;

    async fn update(&self, d: &mut dyn ResourceData) -> Result<()>;

    async fn delete(&self, d: &mut dyn ResourceData) -> Result<()>;
}

/// One CMDB table exposed as a resource type
pub trait CmdbObject: Send + Sync + 'static {
    const TYPE_NAME: &'static str;
    /// Table path under `/api/v2/cmdb`
    const PATH: &'static str;
    /// Field holding the object key
    const MKEY: Field;

    /// Scalar fields copied one to one
    fn fields() -> &'static [Field];

    fn schema() -> Schema;

    /// Fields needing more than a plain copy: subtables, version gates,
    /// netmask handling
    fn expand_special(
        _d: &dyn ResourceData,
        _ctx: &FieldContext,
        _obj: &mut AttributeMap,
    ) -> Result<()> {
        Ok(())
    }

    fn flatten_special(
        _d: &mut dyn ResourceData,
        _obj: &AttributeMap,
        _ctx: &FieldContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Whether a change of `attribute` from `old` to `new` is cosmetic
    fn suppress_diff(_attribute: &str, _old: &Value, _new: &Value) -> bool {
        false
    }
}

/// API object for the current configuration
pub fn expand_object<T: CmdbObject>(d: &dyn ResourceData, ctx: &FieldContext) -> Result<AttributeMap> {
    let mut obj = Map::new();
    expand_fields(d, T::fields(), &mut obj);
    T::expand_special(d, ctx, &mut obj)?;
    Ok(obj)
}

/// Write an API object into state
pub fn flatten_object<T: CmdbObject>(
    d: &mut dyn ResourceData,
    obj: &AttributeMap,
    ctx: &FieldContext,
) -> Result<()> {
    flatten_fields(d, T::fields(), obj)?;
    T::flatten_special(d, obj, ctx)
}

fn has_effective_change<T: CmdbObject>(d: &dyn ResourceData) -> bool {
    d.schema()
        .block
        .attributes
        .keys()
        .filter(|name| ![DYNAMIC_SORT_SUBTABLE, GET_ALL_TABLES, VDOMPARAM].contains(&name.as_str()))
        .any(|name| match d.get_change(name) {
            (Some(old), Some(new)) if old != new => !T::suppress_diff(name, old, new),
            _ => d.has_change(name),
        })
}

/// CRUD for any `CmdbObject`
pub struct CmdbResource<T> {
    provider_data: FortiosProviderData,
    _object: PhantomData<fn() -> T>,
}

impl<T: CmdbObject> CmdbResource<T> {
    pub fn new(provider_data: FortiosProviderData) -> Self {
        Self {
            provider_data,
            _object: PhantomData,
        }
    }

    async fn context(&self, d: &dyn ResourceData) -> Result<FieldContext> {
        let version = self
            .provider_data
            .client
            .firmware_version()
            .await
            .map_err(FortiosError::api(T::TYPE_NAME, "checking firmware for"))?;
        Ok(FieldContext::new(
            d,
            version,
            self.provider_data.config.import_table,
        ))
    }

    fn mkey_from_config(d: &dyn ResourceData) -> Option<String> {
        d.get_ok(T::MKEY.attribute).and_then(forti_string_value)
    }
}

#[async_trait]
impl<T: CmdbObject> FortiResource for CmdbResource<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        T::schema()
    }

    async fn create(&self, d: &mut dyn ResourceData) -> Result<()> {
        let vdom = vdom_param(d, &self.provider_data.config)?;
        let ctx = self.context(d).await?;
        let obj = expand_object::<T>(d, &ctx)?;

        tracing::debug!("Creating {} in vdom {:?}", T::TYPE_NAME, vdom);
        let response = self
            .provider_data
            .client
            .cmdb(T::PATH)
            .create(&obj, vdom.as_deref())
            .await
            .map_err(FortiosError::api(T::TYPE_NAME, "creating"))?;

        let configured = Self::mkey_from_config(d);
        let id = response
            .mkey_string()
            .or(configured)
            .ok_or_else(|| FortiosError::MissingAttribute(T::MKEY.attribute.to_string()))?;
        d.set_id(&id);

        self.read(d).await
    }

    async fn read(&self, d: &mut dyn ResourceData) -> Result<()> {
        let id = d.id().to_string();
        let vdom = vdom_param(d, &self.provider_data.config)?;
        let ctx = self.context(d).await?;

        tracing::debug!("Reading {} {}", T::TYPE_NAME, id);
        let obj = match self
            .provider_data
            .client
            .cmdb(T::PATH)
            .read(&id, vdom.as_deref())
            .await
        {
            Ok(obj) => obj,
            Err(ApiError::NotFound(_)) => {
                tracing::warn!("{} ({}) not found, removing from state", T::TYPE_NAME, id);
                d.set_id("");
                return Ok(());
            }
            Err(e) => return Err(FortiosError::api(T::TYPE_NAME, "reading")(e)),
        };

        flatten_object::<T>(d, &obj, &ctx)
    }

    async fn update(&self, d: &mut dyn ResourceData) -> Result<()> {
        if !has_effective_change::<T>(d) {
            tracing::debug!("No effective change for {} {}", T::TYPE_NAME, d.id());
            return self.read(d).await;
        }

        let id = d.id().to_string();
        let vdom = vdom_param(d, &self.provider_data.config)?;
        let ctx = self.context(d).await?;
        let obj = expand_object::<T>(d, &ctx)?;

        tracing::debug!("Updating {} {}", T::TYPE_NAME, id);
        let response = self
            .provider_data
            .client
            .cmdb(T::PATH)
            .update(&obj, &id, vdom.as_deref())
            .await
            .map_err(FortiosError::api(T::TYPE_NAME, "updating"))?;

        if let Some(mkey) = response.mkey_string() {
            d.set_id(&mkey);
        }

        self.read(d).await
    }

    async fn delete(&self, d: &mut dyn ResourceData) -> Result<()> {
        let id = d.id().to_string();
        let vdom = vdom_param(d, &self.provider_data.config)?;

        tracing::debug!("Deleting {} {}", T::TYPE_NAME, id);
        self.provider_data
            .client
            .cmdb(T::PATH)
            .delete(&id, vdom.as_deref())
            .await
            .map_err(FortiosError::api(T::TYPE_NAME, "deleting"))?;

        d.set_id("");
        Ok(())
    }
}

/// Attributes whose spelling depends on the target firmware
pub fn compatibility() -> &'static FieldCompatibility {
    static REGISTRY: OnceLock<FieldCompatibility> = OnceLock::new();

    REGISTRY.get_or_init(|| {
        FieldCompatibility::new()
            .field(
                router::SDWAN,
                vec![
                    FieldSpelling::new("sdwan", "sdwan", Range::Before("7.0.1".to_string())),
                    FieldSpelling::new(
                        "sdwan_zone",
                        "sdwan-zone",
                        Range::AtLeast("7.0.1".to_string()),
                    ),
                ],
            )
            .field(
                switch_controller::POE_DETECTION,
                vec![
                    FieldSpelling::new(
                        "poe_pre_standard_detection",
                        "poe-pre-standard-detection",
                        Range::Before("6.4.0".to_string()),
                    ),
                    FieldSpelling::new(
                        "poe_detection_type",
                        "poe-detection-type",
                        Range::AtLeast("6.4.0".to_string()),
                    ),
                ],
            )
    })
}
