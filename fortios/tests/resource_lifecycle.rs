use fortios::{FortiosError, FortiosProvider};
use mockito::{Matcher, Server, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tfdata::{MemoryResourceData, ResourceData};

fn status_body(version: &str) -> String {
    json!({
        "http_method": "GET",
        "results": {"hostname": "FGT-LAB", "model_name": "FortiGate"},
        "status": "success",
        "http_status": 200,
        "serial": "FGVM01TM00000000",
        "version": version,
        "build": 1577
    })
    .to_string()
}

fn results(object: Value) -> String {
    json!({"http_method": "GET", "results": [object], "status": "success", "http_status": 200})
        .to_string()
}

fn configured_provider(server: &ServerGuard) -> FortiosProvider {
    let mut provider = FortiosProvider::new();
    provider
        .configure(&json!({
            "hostname": server.url(),
            "token": "lifecycle-token",
            "vdom": "root",
            "max_retries": 0
        }))
        .unwrap();
    provider
}

fn vdom_root() -> Matcher {
    Matcher::UrlEncoded("vdom".into(), "root".into())
}

#[tokio::test]
async fn static_route_lifecycle() {
    let mut server = Server::new_async().await;
    let status = server
        .mock("GET", "/api/v2/monitor/system/status")
        .match_header("authorization", "Bearer lifecycle-token")
        .with_body(status_body("v7.2.8"))
        .expect(1)
        .create_async()
        .await;

    let create = server
        .mock("POST", "/api/v2/cmdb/router/static")
        .match_query(vdom_root())
        .match_body(Matcher::Json(json!({
            "dst": "10.20.0.0/16",
            "gateway": "10.0.0.254",
            "device": "port1",
            "sdwan-zone": [{"name": "underlay"}]
        })))
        .with_body(r#"{"http_method":"POST","status":"success","http_status":200,"mkey":12,"vdom":"root"}"#)
        .create_async()
        .await;
    let first_read = server
        .mock("GET", "/api/v2/cmdb/router/static/12")
        .match_query(vdom_root())
        .with_body(results(json!({
            "seq-num": 12,
            "status": "enable",
            "dst": "10.20.0.0 255.255.0.0",
            "gateway": "10.0.0.254",
            "device": "port1",
            "distance": 10,
            "sdwan-zone": [{"name": "underlay", "q_origin_key": "underlay"}]
        })))
        .expect(1)
        .create_async()
        .await;

    let provider = configured_provider(&server);
    let resource = provider.resource("fortios_router_static").unwrap();
    let schema = resource.schema();

    let mut d = MemoryResourceData::from_config(
        schema.clone(),
        json!({
            "dst": "10.20.0.0/16",
            "gateway": "10.0.0.254",
            "device": "port1",
            "sdwan_zone": [{"name": "underlay"}]
        }),
    );
    resource.create(&mut d).await.unwrap();

    assert_eq!(d.id(), "12");
    assert_eq!(d.get("dst"), Some(&json!("10.20.0.0/16")));
    assert_eq!(d.get("distance"), Some(&json!(10)));
    assert_eq!(d.get("vdomparam"), Some(&json!("root")));
    create.assert_async().await;
    first_read.assert_async().await;
    first_read.remove_async().await;

    // raise the distance
    let update = server
        .mock("PUT", "/api/v2/cmdb/router/static/12")
        .match_query(vdom_root())
        .match_body(Matcher::PartialJson(json!({"distance": 20})))
        .with_body(r#"{"http_method":"PUT","status":"success","http_status":200,"mkey":12}"#)
        .create_async()
        .await;
    let second_read = server
        .mock("GET", "/api/v2/cmdb/router/static/12")
        .match_query(vdom_root())
        .with_body(results(json!({
            "seq-num": 12,
            "dst": "10.20.0.0 255.255.0.0",
            "gateway": "10.0.0.254",
            "device": "port1",
            "distance": 20,
            "sdwan-zone": [{"name": "underlay"}]
        })))
        .create_async()
        .await;

    let prior = d.into_state();
    let mut config = prior.clone();
    config["distance"] = json!(20);
    let mut d = MemoryResourceData::for_update(schema.clone(), "12", prior, config);
    resource.update(&mut d).await.unwrap();

    assert_eq!(d.get("distance"), Some(&json!(20)));
    update.assert_async().await;
    second_read.remove_async().await;

    let delete = server
        .mock("DELETE", "/api/v2/cmdb/router/static/12")
        .match_query(vdom_root())
        .with_body(r#"{"http_method":"DELETE","status":"success","http_status":200}"#)
        .create_async()
        .await;
    resource.delete(&mut d).await.unwrap();
    assert_eq!(d.id(), "");
    delete.assert_async().await;

    // gone from the appliance: refresh drops it from state
    let _gone = server
        .mock("GET", "/api/v2/cmdb/router/static/12")
        .match_query(vdom_root())
        .with_status(404)
        .create_async()
        .await;
    let mut stale = MemoryResourceData::from_state(schema, "12", json!({"seq_num": 12}));
    resource.read(&mut stale).await.unwrap();
    assert_eq!(stale.id(), "");

    // firmware version was fetched once for the whole session
    status.assert_async().await;
}

#[tokio::test]
async fn auth_failure_is_reported_with_resource() {
    let mut server = Server::new_async().await;
    let _status = server
        .mock("GET", "/api/v2/monitor/system/status")
        .with_status(401)
        .create_async()
        .await;

    let provider = configured_provider(&server);
    let resource = provider.resource("fortios_firewall_address").unwrap();
    let mut d = MemoryResourceData::from_config(resource.schema(), json!({"name": "web"}));

    let err = resource.create(&mut d).await.unwrap_err();
    assert!(matches!(err, FortiosError::Api { .. }));
    assert!(err.to_string().contains("fortios_firewall_address"));
    assert!(err.to_string().contains("Authentication failed"));
}

#[test]
fn address_group_read_with_block_on() {
    let mut server = Server::new();
    let _status = server
        .mock("GET", "/api/v2/monitor/system/status")
        .with_body(status_body("v7.4.3"))
        .create();
    let _get = server
        .mock("GET", "/api/v2/cmdb/firewall/addrgrp/servers")
        .match_query(vdom_root())
        .with_body(results(json!({
            "name": "servers",
            "member": [{"name": "web10"}, {"name": "web9"}],
            "color": "6"
        })))
        .create();

    let provider = configured_provider(&server);
    let resource = provider.resource("fortios_firewall_addrgrp").unwrap();
    let mut d = MemoryResourceData::from_state(
        resource.schema(),
        "servers",
        json!({"name": "servers", "dynamic_sort_subtable": "natural", "member": [{"name": "web9"}]}),
    );

    tokio_test::block_on(resource.read(&mut d)).unwrap();

    assert_eq!(d.get("member"), Some(&json!([{"name": "web9"}, {"name": "web10"}])));
    assert_eq!(d.get("color"), Some(&json!(6)));
}
