//! End-to-end tool scenarios over the in-memory client
//!
//! Exercises the tool registry the way a transport would: dispatch by name
//! with JSON arguments, assert on the structured responses.

mod common;

use common::{context_with, item, link, thing};
use openhab_mcp_rust::client::OpenHabClient;
use openhab_mcp_rust::mock::MockOpenHabClient;
use serde_json::json;

fn lighting_inventory() -> Vec<openhab_mcp_rust::models::Item> {
    let mut items = Vec::new();
    for i in 0..5 {
        items.push(item(
            &format!("Lamp_{i}"),
            "Switch",
            Some("OFF"),
            &["Lighting"],
        ));
    }
    for i in 0..15 {
        items.push(item(
            &format!("Sensor_{i}"),
            "Number",
            Some("21.5"),
            &["Temperature"],
        ));
    }
    items
}

#[tokio::test]
async fn filtered_listing_paginates_over_the_filtered_set() {
    let (_, context) = context_with(MockOpenHabClient::new().with_items(lighting_inventory()));

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "list_items",
        json!({"filter_tag": "Lighting", "offset": 0, "limit": 3}),
    )
    .await;

    assert_eq!(response.status, "success");
    assert_eq!(response.data["items"].as_array().unwrap().len(), 3);
    assert_eq!(response.data["total"], json!(5));

    // Second page holds the remaining two
    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "list_items",
        json!({"filter_tag": "Lighting", "offset": 3, "limit": 3}),
    )
    .await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["items"].as_array().unwrap().len(), 2);
    assert_eq!(response.data["total"], json!(5));
}

#[tokio::test]
async fn offset_past_the_end_yields_an_empty_page_with_true_total() {
    let (_, context) = context_with(MockOpenHabClient::new().with_items(lighting_inventory()));

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "list_items",
        json!({"filter_tag": "Lighting", "offset": 100, "limit": 10}),
    )
    .await;

    assert_eq!(response.status, "success");
    assert!(response.data["items"].as_array().unwrap().is_empty());
    assert_eq!(response.data["total"], json!(5));
}

#[tokio::test]
async fn unknown_filter_key_is_rejected() {
    let (_, context) = context_with(MockOpenHabClient::new().with_items(lighting_inventory()));

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "list_items",
        json!({"filter_colour": "red"}),
    )
    .await;

    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("invalid_argument"));
}

#[tokio::test]
async fn zero_limit_is_rejected() {
    let (_, context) = context_with(MockOpenHabClient::new().with_items(lighting_inventory()));

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "list_items", json!({"limit": 0})).await;
    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("invalid_argument"));
}

#[tokio::test]
async fn orphans_appear_when_their_thing_disappears_and_purge_is_idempotent() {
    let client = MockOpenHabClient::new()
        .with_things(vec![
            thing("hue:bulb:living", &["power", "brightness"]),
            thing("hue:bulb:kitchen", &["power"]),
        ])
        .with_links(vec![
            link("Living_Light", "hue:bulb:living:power"),
            link("Kitchen_Light", "hue:bulb:kitchen:power"),
        ]);
    let (client, context) = context_with(client);

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_orphan_links", json!({})).await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["count"], json!(0));

    client.remove_thing("hue:bulb:kitchen").await;

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_orphan_links", json!({})).await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["count"], json!(1));
    assert_eq!(
        response.data["orphans"][0]["channelUID"],
        json!("hue:bulb:kitchen:power")
    );

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "purge_orphan_links", json!({})).await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["removed"].as_array().unwrap().len(), 1);

    // A second purge finds nothing left to remove
    let response =
        openhab_mcp_rust::tools::dispatch(&context, "purge_orphan_links", json!({})).await;
    assert_eq!(response.status, "success");
    assert!(response.data["removed"].as_array().unwrap().is_empty());

    // The link whose thing survived is untouched
    let response = openhab_mcp_rust::tools::dispatch(&context, "list_links", json!({})).await;
    assert_eq!(response.status, "success");
    let remaining = response.data.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["itemName"], json!("Living_Light"));
}

#[tokio::test]
async fn orphan_detection_fails_closed_when_things_are_unreachable() {
    let client = MockOpenHabClient::new()
        .with_links(vec![link("Living_Light", "hue:bulb:living:power")]);
    let (client, context) = context_with(client);
    client.set_things_unavailable(true).await;

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_orphan_links", json!({})).await;
    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("remote_unavailable"));

    // Nothing was deleted under uncertainty
    client.set_things_unavailable(false).await;
    let response = openhab_mcp_rust::tools::dispatch(&context, "list_links", json!({})).await;
    assert_eq!(response.data.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn link_upsert_requires_a_resolvable_channel() {
    let client =
        MockOpenHabClient::new().with_things(vec![thing("hue:bulb:living", &["power"])]);
    let (_, context) = context_with(client);

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "create_or_update_link",
        json!({"item_name": "Living_Light", "channel_uid": "hue:bulb:gone:power"}),
    )
    .await;
    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("invalid_argument"));

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "create_or_update_link",
        json!({"item_name": "Living_Light", "channel_uid": "hue:bulb:living:power"}),
    )
    .await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["channelUID"], json!("hue:bulb:living:power"));
}

#[tokio::test]
async fn link_delete_reports_whether_the_link_existed() {
    let client = MockOpenHabClient::new()
        .with_things(vec![thing("hue:bulb:living", &["power"])])
        .with_links(vec![link("Living_Light", "hue:bulb:living:power")]);
    let (_, context) = context_with(client);

    let args = json!({"item_name": "Living_Light", "channel_uid": "hue:bulb:living:power"});
    let response =
        openhab_mcp_rust::tools::dispatch(&context, "delete_link", args.clone()).await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["existed"], json!(true));

    let response = openhab_mcp_rust::tools::dispatch(&context, "delete_link", args).await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["existed"], json!(false));
}

#[tokio::test]
async fn bulk_purge_reports_per_target_outcomes_instead_of_aborting() {
    let client = MockOpenHabClient::new()
        .with_things(vec![thing("hue:bulb:living", &["power"])])
        .with_links(vec![
            link("Hall_Light", "hue:bulb:hall:power"),
            link("Porch_Light", "hue:bulb:porch:power"),
        ]);
    let (client, context) = context_with(client);
    client.fail_link_deletes_on("hue:bulb:porch:power").await;

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "purge_orphan_links", json!({})).await;

    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("partial_failure"));
    let report = &response.data["report"];
    assert_eq!(report["removed"].as_array().unwrap().len(), 1);
    assert_eq!(report["failed"].as_array().unwrap().len(), 1);
    assert_eq!(
        report["removed"][0]["channel_uid"],
        json!("hue:bulb:hall:power")
    );
}

#[tokio::test]
async fn delete_all_links_covers_item_names_and_thing_uids() {
    let client = MockOpenHabClient::new()
        .with_things(vec![thing("hue:bulb:living", &["power", "brightness"])])
        .with_links(vec![
            link("Living_Light", "hue:bulb:living:power"),
            link("Living_Dimmer", "hue:bulb:living:brightness"),
            link("Living_Light", "hue:bulb:kitchen:power"),
        ]);
    let (_, context) = context_with(client);

    // By thing UID: both channels of the living-room bulb
    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "delete_all_links_for_object",
        json!({"object_id": "hue:bulb:living"}),
    )
    .await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["removed"].as_array().unwrap().len(), 2);

    // By item name: the leftover kitchen link
    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "delete_all_links_for_object",
        json!({"object_id": "Living_Light"}),
    )
    .await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["removed"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn item_patch_merges_and_writes_back() {
    let client = MockOpenHabClient::new().with_items(vec![item(
        "Kitchen_Light",
        "Switch",
        Some("ON"),
        &["Lighting"],
    )]);
    let (client, context) = context_with(client);

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "update_item",
        json!({"item_name": "Kitchen_Light", "item": {"label": "Ceiling light", "tags": null}}),
    )
    .await;

    assert_eq!(response.status, "success");
    assert_eq!(response.data["label"], json!("Ceiling light"));
    assert_eq!(response.data["state"], json!("ON"));
    assert_eq!(response.data["tags"], json!([]));

    // The merged representation is what the remote now holds
    let stored = client.list_items().await.unwrap();
    assert_eq!(stored[0].label.as_deref(), Some("Ceiling light"));
    assert!(stored[0].tags.is_empty());
}

#[tokio::test]
async fn item_patch_cannot_rename() {
    let client = MockOpenHabClient::new().with_items(vec![item(
        "Kitchen_Light",
        "Switch",
        Some("ON"),
        &[],
    )]);
    let (_, context) = context_with(client);

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "update_item",
        json!({"item_name": "Kitchen_Light", "item": {"name": "Renamed"}}),
    )
    .await;
    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("invalid_argument"));
}

#[tokio::test]
async fn rule_script_action_update_is_scoped_to_one_action() {
    let rule: openhab_mcp_rust::models::Rule = serde_json::from_value(json!({
        "uid": "rule-1",
        "name": "Evening lights",
        "actions": [
            {"id": "A1", "type": "script.ScriptAction",
             "configuration": {"type": "application/javascript", "script": "one();"}},
            {"id": "A2", "type": "script.ScriptAction",
             "configuration": {"type": "application/javascript", "script": "two();"}}
        ]
    }))
    .unwrap();
    let (_, context) = context_with(MockOpenHabClient::new().with_rules(vec![rule]));

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "update_rule_script_action",
        json!({
            "rule_uid": "rule-1",
            "action_id": "A2",
            "script_type": "application/javascript",
            "script_content": "two_v2();"
        }),
    )
    .await;

    assert_eq!(response.status, "success");
    let actions = response.data["actions"].as_array().unwrap();
    assert_eq!(actions[0]["configuration"]["script"], json!("one();"));
    assert_eq!(actions[1]["configuration"]["script"], json!("two_v2();"));
}

#[tokio::test]
async fn scripts_are_rules_tagged_script_without_triggers() {
    let (_, context) = context_with(MockOpenHabClient::new());

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "create_script",
        json!({
            "script_id": "morning_scene",
            "script_type": "application/javascript",
            "content": "lights.on();"
        }),
    )
    .await;
    assert_eq!(response.status, "success");

    let response = openhab_mcp_rust::tools::dispatch(&context, "list_scripts", json!({})).await;
    assert_eq!(response.status, "success");
    let scripts = response.data.as_array().unwrap();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0]["uid"], json!("morning_scene"));
    assert_eq!(scripts[0]["tags"], json!(["Script"]));
    assert!(scripts[0]["triggers"].as_array().unwrap().is_empty());

    // A triggered rule carrying the tag is still not a script
    let rule: openhab_mcp_rust::models::Rule = serde_json::from_value(json!({
        "uid": "not-a-script",
        "name": "Tagged but triggered",
        "tags": ["Script"],
        "triggers": [{"id": "t1", "type": "timer.GenericCronTrigger"}]
    }))
    .unwrap();
    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "create_rule",
        json!({"rule": serde_json::to_value(&rule).unwrap()}),
    )
    .await;
    assert_eq!(response.status, "success");

    let response = openhab_mcp_rust::tools::dispatch(&context, "list_scripts", json!({})).await;
    assert_eq!(response.data.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn thing_diagnostics_tools_pass_through_config_and_firmware_state() {
    let client = MockOpenHabClient::new()
        .with_things(vec![thing("zwave:device:stick:node4", &["switch"])])
        .with_config_status(
            "zwave:device:stick:node4",
            vec![serde_json::from_value(json!({
                "parameterName": "pollPeriod",
                "type": "WARNING",
                "message": "Value out of range"
            }))
            .unwrap()],
        )
        .with_firmware_status(
            "zwave:device:stick:node4",
            serde_json::from_value(json!({
                "status": "UPDATE_AVAILABLE",
                "updatableVersion": "4.2"
            }))
            .unwrap(),
        )
        .with_firmwares(
            "zwave:device:stick:node4",
            vec![serde_json::from_value(json!({
                "version": "4.2",
                "vendor": "Aeotec"
            }))
            .unwrap()],
        );
    let (_, context) = context_with(client);

    let args = json!({"thing_uid": "zwave:device:stick:node4"});
    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_thing_config_status", args.clone()).await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data[0]["parameterName"], json!("pollPeriod"));
    assert_eq!(response.data[0]["type"], json!("WARNING"));

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_thing_firmware_status", args.clone())
            .await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data["status"], json!("UPDATE_AVAILABLE"));
    assert_eq!(response.data["updatableVersion"], json!("4.2"));

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_available_firmwares", args).await;
    assert_eq!(response.status, "success");
    assert_eq!(response.data[0]["version"], json!("4.2"));
}

#[tokio::test]
async fn thing_diagnostics_default_to_empty_when_nothing_is_reported() {
    let client =
        MockOpenHabClient::new().with_things(vec![thing("hue:bulb:living", &["power"])]);
    let (_, context) = context_with(client);

    let args = json!({"thing_uid": "hue:bulb:living"});
    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_thing_config_status", args.clone()).await;
    assert_eq!(response.status, "success");
    assert!(response.data.as_array().unwrap().is_empty());

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "get_thing_firmware_status", args.clone())
            .await;
    assert_eq!(response.status, "success");
    assert!(response.data.is_null());

    // An unresolvable thing is still NotFound, not an empty report
    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "get_available_firmwares",
        json!({"thing_uid": "hue:bulb:gone"}),
    )
    .await;
    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("not_found"));
}

#[tokio::test]
async fn missing_entities_surface_not_found() {
    let (_, context) = context_with(MockOpenHabClient::new());

    let response = openhab_mcp_rust::tools::dispatch(
        &context,
        "get_item",
        json!({"item_name": "Ghost"}),
    )
    .await;
    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("not_found"));
}

#[tokio::test]
async fn unknown_tool_is_an_invalid_argument() {
    let (_, context) = context_with(MockOpenHabClient::new());

    let response =
        openhab_mcp_rust::tools::dispatch(&context, "reboot_the_house", json!({})).await;
    assert_eq!(response.status, "error");
    assert_eq!(response.data["kind"], json!("invalid_argument"));
}
