// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::items::{
    ItemEdit, LineItem, apply_item_edit, deserialize_items, new_item, remove_item,
    serialize_items,
};
use billfold::totals::compute_totals;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn sample() -> Vec<LineItem> {
    vec![
        LineItem {
            id: "a".into(),
            label: Some("Diseño".into()),
            detail: Some("Logo y manual de marca".into()),
            unit_amount: dec("100"),
            quantity: dec("2"),
            line_total: dec("200"),
        },
        LineItem {
            id: "b".into(),
            label: None,
            detail: None,
            unit_amount: dec("50.25"),
            quantity: dec("1"),
            line_total: dec("50.25"),
        },
    ]
}

#[test]
fn new_item_is_one_unit_at_zero() {
    let a = new_item();
    let b = new_item();
    assert_ne!(a.id, b.id);
    assert_eq!(a.quantity, Decimal::ONE);
    assert!(a.unit_amount.is_zero() && a.line_total.is_zero());
}

#[test]
fn amount_edit_recomputes_line_total() {
    let out = apply_item_edit(&sample(), "b", ItemEdit::UnitAmount(dec("-10")));
    assert_eq!(out[1].line_total, dec("-10"));
    assert_eq!(out[0], sample()[0]);
}

#[test]
fn label_edit_leaves_line_total_alone() {
    let mut items = sample();
    items[0].line_total = dec("1");
    let out = apply_item_edit(&items, "a", ItemEdit::Label(Some("Otro".into())));
    assert_eq!(out[0].label.as_deref(), Some("Otro"));
    assert_eq!(out[0].line_total, dec("1"));
}

#[test]
fn edit_keeps_ids_and_order() {
    let out = apply_item_edit(&sample(), "b", ItemEdit::Detail(None));
    let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(out[1].detail, None);
}

#[test]
fn edit_of_unknown_item_is_a_no_op() {
    let items = sample();
    let out = apply_item_edit(&items, "nope", ItemEdit::Quantity(dec("9")));
    assert_eq!(out, items);
}

#[test]
fn remove_item_drops_only_the_match() {
    let out = remove_item(&sample(), "a");
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "b");
    assert_eq!(remove_item(&sample(), "zzz"), sample());
}

#[test]
fn round_trip_preserves_items() {
    let items = sample();
    let text = serialize_items(&items);
    assert_eq!(deserialize_items(Some(&text)), items);
    assert_eq!(deserialize_items(Some(&serialize_items(&[]))), Vec::<LineItem>::new());
}

#[test]
fn serialized_keys_are_camel_case() {
    let v: serde_json::Value = serde_json::from_str(&serialize_items(&sample())).unwrap();
    let first = v[0].as_object().unwrap();
    for key in ["id", "label", "detail", "unitAmount", "quantity", "lineTotal"] {
        assert!(first.contains_key(key), "missing {}", key);
    }
    assert!(!v[1].as_object().unwrap().contains_key("label"));
}

#[test]
fn malformed_input_loads_empty() {
    assert!(deserialize_items(None).is_empty());
    assert!(deserialize_items(Some("")).is_empty());
    assert!(deserialize_items(Some("   ")).is_empty());
    assert!(deserialize_items(Some("{not json")).is_empty());
    assert!(deserialize_items(Some("null")).is_empty());
    assert!(deserialize_items(Some("{\"id\":\"a\"}")).is_empty());
}

#[test]
fn legacy_keys_and_loose_numbers_are_accepted() {
    let blob = r#"[
        {"id":"x1","index":0,"detalle":"Servicio","parrafo":"Mensual","monto":100,"cantidad":2,"importe":200},
        {"id":"x2","detalle":"Horas","monto":"12.5","cantidad":"4"},
        {"id":"x3","monto":"abc","cantidad":null,"importe":41.4}
    ]"#;
    let items = deserialize_items(Some(blob));
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].label.as_deref(), Some("Servicio"));
    assert_eq!(items[0].detail.as_deref(), Some("Mensual"));
    assert_eq!(items[0].line_total, dec("200"));
    assert_eq!(items[1].unit_amount, dec("12.5"));
    assert_eq!(items[1].quantity, dec("4"));
    // missing line total counts as zero
    assert!(items[1].line_total.is_zero());
    assert!(items[2].unit_amount.is_zero() && items[2].quantity.is_zero());
    assert_eq!(items[2].line_total, dec("41.4"));

    let t = compute_totals(&items, Decimal::ZERO, false);
    assert_eq!(t.subtotal, dec("241.4"));
}

#[test]
fn items_without_id_get_the_same_id_on_every_load() {
    let blob = r#"[
        {"detalle":"x","monto":100,"cantidad":2,"importe":200},
        {"id":"kept","monto":1,"cantidad":1,"importe":1},
        {"id":"  ","monto":5,"cantidad":1,"importe":5}
    ]"#;
    let first = deserialize_items(Some(blob));
    let second = deserialize_items(Some(blob));
    assert_eq!(first, second);
    let ids: Vec<_> = first.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["item-1", "kept", "item-3"]);

    let edited = apply_item_edit(&first, &second[0].id, ItemEdit::Quantity(dec("3")));
    assert_eq!(edited[0].line_total, dec("300"));
}

#[test]
fn oddly_typed_text_fields_do_not_wipe_the_list() {
    let blob = r#"[
        {"id":7,"detalle":5,"parrafo":true,"monto":10,"cantidad":1,"importe":10},
        {"id":"b","detalle":["x"],"parrafo":null,"monto":2,"cantidad":1,"importe":2}
    ]"#;
    let items = deserialize_items(Some(blob));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "7");
    assert_eq!(items[0].label.as_deref(), Some("5"));
    assert_eq!(items[0].detail.as_deref(), Some("true"));
    assert_eq!(items[1].label, None);
    assert_eq!(items[1].detail, None);
    assert_eq!(compute_totals(&items, Decimal::ZERO, false).subtotal, dec("12"));
}

fn text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9 ñáé\"\\\\]{0,16}")
}

proptest! {
    #[test]
    fn any_item_list_round_trips(
        rows in prop::collection::vec(
            (text(), text(), -1_000_000i64..1_000_000, 0u32..6, -500i64..500, 0u32..3),
            0..6,
        )
    ) {
        let items: Vec<LineItem> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (label, detail, u, us, q, qs))| {
                let unit_amount = Decimal::new(u, us);
                let quantity = Decimal::new(q, qs);
                LineItem {
                    id: format!("id-{}", i),
                    label,
                    detail,
                    unit_amount,
                    quantity,
                    line_total: unit_amount * quantity,
                }
            })
            .collect();
        let back = deserialize_items(Some(&serialize_items(&items)));
        prop_assert_eq!(back, items);
    }
}
