//! CMDB (configuration database) table operations
//!
//! Every configuration object type lives under `/api/v2/cmdb/{path}` and is
//! addressed by its mkey.

use super::common::{ApiQueryParams, AttributeMap, FortiResponse};
use super::error::ApiError;
use super::Client;

const CMDB_PREFIX: &str = "/api/v2/cmdb";

/// Operations on one CMDB table, e.g. `firewall/address`
pub struct CmdbApi<'a> {
    client: &'a Client,
    path: &'a str,
}

impl<'a> CmdbApi<'a> {
    pub fn new(client: &'a Client, path: &'a str) -> Self {
        Self { client, path }
    }

    fn collection_path(&self, vdom: Option<&str>) -> String {
        format!(
            "{}/{}{}",
            CMDB_PREFIX,
            self.path,
            ApiQueryParams::new().vdom(vdom).to_query_string()
        )
    }

    fn object_path(&self, mkey: &str, vdom: Option<&str>) -> String {
        format!(
            "{}/{}/{}{}",
            CMDB_PREFIX,
            self.path,
            urlencoding::encode(mkey),
            ApiQueryParams::new().vdom(vdom).to_query_string()
        )
    }

    /// POST /api/v2/cmdb/{path}
    pub async fn create(
        &self,
        obj: &AttributeMap,
        vdom: Option<&str>,
    ) -> Result<FortiResponse, ApiError> {
        self.client.post(&self.collection_path(vdom), obj).await
    }

    /// GET /api/v2/cmdb/{path}/{mkey}
    pub async fn read(&self, mkey: &str, vdom: Option<&str>) -> Result<AttributeMap, ApiError> {
        let path = self.object_path(mkey, vdom);
        let response = self.client.get(&path).await?;

        response
            .first_result()
            .cloned()
            .ok_or(ApiError::NotFound(path))
    }

    /// PUT /api/v2/cmdb/{path}/{mkey}
    pub async fn update(
        &self,
        obj: &AttributeMap,
        mkey: &str,
        vdom: Option<&str>,
    ) -> Result<FortiResponse, ApiError> {
        self.client.put(&self.object_path(mkey, vdom), obj).await
    }

    /// DELETE /api/v2/cmdb/{path}/{mkey}
    pub async fn delete(&self, mkey: &str, vdom: Option<&str>) -> Result<FortiResponse, ApiError> {
        self.client.delete(&self.object_path(mkey, vdom)).await
    }
}
