//! Classification of captured platform payloads.

use feishu_events::model::app::{AppStatus, BuyType};
use feishu_events::model::approval::TimeUnit;
use feishu_events::model::message::MsgType;
use feishu_events::{Event, EventContent, classify};
use serde_json::json;

#[test]
fn test_user_status_change_callback() {
    let payload = json!({
        "uuid": "5226cd85b4d843dccee2e279d93f3ed3",
        "event": {
            "app_id": "cli_9e28cb7ba56a100e",
            "before_status": {"is_active": true, "is_frozen": true, "is_resigned": false},
            "change_time": "2020-05-20 18:33:25",
            "current_status": {"is_active": true, "is_frozen": false, "is_resigned": false},
            "employee_id": "75ge6c49",
            "open_id": "ou_2ef04637d933f798dcb92c99e845ed09",
            "tenant_key": "2d520d3b434f175e",
            "type": "user_status_change"
        },
        "token": "GzhQEyfUcx7eEungQFWtXgCbxSpUOJIb",
        "ts": "1589970805.376395",
        "type": "event_callback"
    });

    let event = Event::from_callback(&payload).unwrap();
    match &event.event {
        EventContent::UserStatusChange(change) => {
            assert!(change.before_status.is_frozen);
            assert!(!change.current_status.is_frozen);
            assert_eq!(change.employee_id, "75ge6c49");
            assert_eq!(change.union_id, "");
        }
        other => panic!("unexpected variant: {other:?}"),
    }
    assert_eq!(event.event.tenant_key(), Some("2d520d3b434f175e"));
}

#[test]
fn test_app_events() {
    let status = classify(json!({
        "app_id": "cli_xxx",
        "tenant_key": "xxx",
        "type": "app_status_change",
        "status": "stop_by_platform"
    }))
    .unwrap();
    assert!(matches!(
        status,
        EventContent::AppStatusChange(ref e) if e.status == AppStatus::StopByPlatform
    ));

    let order = classify(json!({
        "type": "order_paid",
        "app_id": "cli_9daeceab98721136",
        "order_id": "6704894492631105539",
        "price_plan_id": "price_9d86fa1333b8110c",
        "price_plan_type": "per_seat_per_month",
        "seats": 20,
        "buy_count": 1,
        "create_time": "1502199207",
        "pay_time": "1502199209",
        "buy_type": "upgrade",
        "src_order_id": "6704894492631105539",
        "order_pay_price": 10000,
        "tenant_key": "2f98c01bc23f6847"
    }))
    .unwrap();
    match order {
        EventContent::OrderPaid(e) => {
            assert_eq!(e.buy_type, Some(BuyType::Upgrade));
            assert_eq!(e.order_pay_price, 10000);
        }
        other => panic!("unexpected variant: {other:?}"),
    }

    let open = classify(json!({
        "app_id": "cli_xxx",
        "tenant_key": "xxx",
        "type": "app_open",
        "applicants": [{"open_id": "ou_1"}]
    }))
    .unwrap();
    assert!(matches!(open, EventContent::AppOpen(ref e) if e.installer.is_none()));
}

#[test]
fn test_merge_forward_message() {
    let content = classify(json!({
        "type": "message",
        "app_id": "cli_xxx",
        "tenant_key": "xxx",
        "root_id": "",
        "parent_id": "",
        "open_chat_id": "oc_5ce6d572455d361153b7cb51da133945",
        "msg_type": "merge_forward",
        "open_id": "ou_18eac85d35a26f989317ad4f02e8bbbb",
        "open_message_id": "om_b3961b120d67259e7495d8eb69488189",
        "is_mention": false,
        "chat_type": "private",
        "chat_id": "6642174187597201422",
        "user": "6610187460791558158",
        "msg_list": [
            {
                "open_chat_id": "oc_b74c59c68d0f2d0ac65846272499d651",
                "msg_type": "image",
                "open_message_id": "be1000265b014075a869134b20c87633",
                "image_key": "99295878-5e85-41a3-bb00-0ad63b5b156d",
                "create_time": 1550044148
            },
            {
                "open_chat_id": "oc_b74c59c68d0f2d0ac65846272499d651",
                "msg_type": "text",
                "open_message_id": "om_a96c620f2aa036e3c08abebaec7f09d1",
                "text": "hello",
                "create_time": 1550044749
            }
        ]
    }))
    .unwrap();

    match content {
        EventContent::MergeForwardMessage(e) => {
            assert_eq!(e.msg_list.len(), 2);
            assert_eq!(e.msg_list[0].msg_type, MsgType::Image);
            assert_eq!(e.msg_list[1].text, "hello");
            assert_eq!(e.msg_list[1].image_key, "");
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_out_approval() {
    let content = classify(json!({
        "app_id": "cli_9e28cb7ba56a100e",
        "i18n_resources": [{
            "is_default": true,
            "locale": "zh_cn",
            "texts": {"@i18n@someKey": "text"}
        }],
        "instance_code": "59558CEE-CEF4-45C9-A2C3-DCBF8BEC7341",
        "out_image": "",
        "out_interval": 10800,
        "out_name": "@i18n@someKey",
        "out_reason": "reason",
        "out_start_time": "2020-05-15 15:00:00",
        "out_end_time": "2020-05-15 18:00:00",
        "out_unit": "HOUR",
        "start_time": 1589527346,
        "end_time": 1589527354,
        "tenant_key": "2d520d3b434f175e",
        "type": "out_approval",
        "user_id": "g6964gd3"
    }))
    .unwrap();

    match content {
        EventContent::OutApproval(e) => {
            assert_eq!(e.out_unit, TimeUnit::Hour);
            assert_eq!(e.i18n_resources[0].texts["@i18n@someKey"], "text");
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_group_setting_update_partial_settings() {
    let content = classify(json!({
        "tenant_key": "2d520d3b434f175e",
        "type": "group_setting_update",
        "app_id": "cli_9e28cb7ba56a100e",
        "chat_id": "oc_066cad06159f0752fe02c9af8aebfc5a",
        "after_change": {"message_notification": false},
        "before_change": {"message_notification": true},
        "operator": {"open_id": "ou_55a50f4c6eba6adbfc8b94803fe78825", "user_id": "g6964gd3"}
    }))
    .unwrap();

    match content {
        EventContent::GroupSettingUpdate(e) => {
            assert_eq!(e.after_change.message_notification, Some(false));
            assert!(e.after_change.owner_open_id.is_none());
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_sparse_billing_and_setting_events_still_classify() {
    let order = classify(json!({
        "type": "order_paid",
        "app_id": "cli_9daeceab98721136",
        "tenant_key": "2f98c01bc23f6847",
        "order_id": "6704894492631105539"
    }))
    .unwrap();
    match order {
        EventContent::OrderPaid(e) => {
            assert_eq!(e.order_id, "6704894492631105539");
            assert_eq!(e.price_plan_type, "per_seat_per_month");
            assert_eq!(e.seats, 0);
            assert!(e.buy_type.is_none());
        }
        other => panic!("unexpected variant: {other:?}"),
    }

    let setting = classify(json!({
        "type": "group_setting_update",
        "app_id": "cli_9e28cb7ba56a100e",
        "tenant_key": "2d520d3b434f175e",
        "chat_id": "oc_066cad06159f0752fe02c9af8aebfc5a",
        "after_change": {"add_member_permission": "owner"}
    }))
    .unwrap();
    match setting {
        EventContent::GroupSettingUpdate(e) => {
            assert_eq!(e.after_change.add_member_permission.as_deref(), Some("owner"));
            assert_eq!(e.before_change, Default::default());
            assert!(e.operator.is_none());
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_event_reply_accepts_misspelled_timestamp() {
    let content = classify(json!({
        "app_id": "cli_xxxxxx",
        "type": "event_reply",
        "tenant_key": "xxxxx",
        "event_id": "xxxx",
        "attendee": {"open_id": "xxx", "employee_id": "yyy", "union_id": "zzz"},
        "status": "accept",
        "display_name": "xxx",
        "reply_timestmap": "1589097034"
    }))
    .unwrap();

    assert!(matches!(
        content,
        EventContent::EventReply(ref e) if e.reply_timestamp == "1589097034"
    ));
}
