//! Test helpers for resources

use mockito::{Mock, ServerGuard};
use tfdata::ResourceData;

use crate::api::test_helpers::create_test_client;
use crate::config::ProviderConfig;
use crate::provider_data::FortiosProviderData;

pub fn provider_data(url: &str, vdom: Option<&str>) -> FortiosProviderData {
    let config = ProviderConfig {
        hostname: url.to_string(),
        token: "test-token".to_string(),
        insecure: true,
        vdom: vdom.map(str::to_string),
        import_table: false,
        http_proxy: None,
        retry: Default::default(),
    };
    FortiosProviderData::new(create_test_client(url), config)
}

/// Mock `GET /api/v2/monitor/system/status` reporting `version`
pub async fn mock_system_status(server: &mut ServerGuard, version: &str) -> Mock {
    server
        .mock("GET", "/api/v2/monitor/system/status")
        .with_body(format!(
            r#"{{"http_method":"GET","results":{{"hostname":"FGT-LAB","model_name":"FortiGate"}},"status":"success","http_status":200,"serial":"FGVM01TM00000000","version":"v{}","build":1234}}"#,
            version
        ))
        .create_async()
        .await
}

/// CMDB read envelope around one object
pub fn cmdb_results(object: serde_json::Value) -> String {
    serde_json::json!({
        "http_method": "GET",
        "results": [object],
        "status": "success",
        "http_status": 200
    })
    .to_string()
}

pub fn state_of(d: &dyn ResourceData, path: &str) -> serde_json::Value {
    d.get(path).cloned().unwrap_or(serde_json::Value::Null)
}
