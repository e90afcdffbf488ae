// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use billfold::commands::{invoices, items};
use billfold::models::{Currency, Invoice, InvoiceFields, InvoiceStatus};
use billfold::session::{SessionProvider, StaticSession, User};
use billfold::store::{RecordStore, SqliteStore};
use billfold::{cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn run(conn: &Connection, session: &dyn SessionProvider, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["billfold"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("invoice", m)) => invoices::handle(conn, session, m),
        Some(("item", m)) => items::handle(conn, session, m),
        _ => panic!("unexpected command {:?}", args),
    }
}

fn new_invoice(conn: &Connection, user: &str) -> Invoice {
    let store = SqliteStore::new(conn);
    let u = User { id: user.into() };
    invoices::create(&store, &u, Currency::Peso).unwrap()
}

fn reload(conn: &Connection, id: &str) -> Invoice {
    SqliteStore::new(conn).get(id).unwrap()
}

#[test]
fn editing_items_and_discount_saves_totals() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let inv = new_invoice(&conn, "u1");

    run(&conn, &me, &["item", "add", &inv.id, "--label", "Diseño", "--amount", "100", "--qty", "2"]).unwrap();
    run(&conn, &me, &["item", "add", &inv.id, "--amount", "50"]).unwrap();
    run(&conn, &me, &["invoice", "set", &inv.id, "--discount", "20", "--client", " Acme ", "--tax"]).unwrap();

    let saved = reload(&conn, &inv.id);
    assert_eq!(saved.client, "Acme");
    assert_eq!(saved.items.len(), 2);
    assert_eq!(saved.items[0].line_total, dec("200"));
    assert_eq!(saved.items[1].quantity, Decimal::ONE);
    assert_eq!(saved.subtotal, dec("250"));
    assert_eq!(saved.tax, dec("41.4"));
    assert_eq!(saved.total, dec("271.4"));

    run(&conn, &me, &["invoice", "set", &inv.id, "--no-tax"]).unwrap();
    let saved = reload(&conn, &inv.id);
    assert!(saved.tax.is_zero());
    assert_eq!(saved.total, dec("230"));
}

#[test]
fn item_set_and_rm_recompute_totals() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let inv = new_invoice(&conn, "u1");
    run(&conn, &me, &["invoice", "set", &inv.id, "--tax"]).unwrap();
    run(&conn, &me, &["item", "add", &inv.id, "--amount", "100", "--qty", "2"]).unwrap();
    run(&conn, &me, &["item", "add", &inv.id, "--amount", "50", "--qty", "1"]).unwrap();
    let first = reload(&conn, &inv.id).items[0].id.clone();
    let second = reload(&conn, &inv.id).items[1].clone();

    run(&conn, &me, &["item", "set", &inv.id, &first, "--qty", "3"]).unwrap();
    let saved = reload(&conn, &inv.id);
    assert_eq!(saved.items[0].line_total, dec("300"));
    assert_eq!(saved.items[1], second);
    assert_eq!(saved.subtotal, dec("350"));

    run(&conn, &me, &["item", "rm", &inv.id, &first]).unwrap();
    let saved = reload(&conn, &inv.id);
    assert_eq!(saved.items.len(), 1);
    assert_eq!(saved.total, dec("59.00"));
}

#[test]
fn new_invoice_starts_without_tax() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let inv = new_invoice(&conn, "u1");
    assert!(!inv.tax_included);

    run(&conn, &me, &["item", "add", &inv.id, "--amount", "100", "--qty", "2"]).unwrap();
    let saved = reload(&conn, &inv.id);
    assert!(saved.tax.is_zero());
    assert_eq!(saved.total, dec("200"));
}

#[test]
fn legacy_items_without_ids_can_be_edited() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let mut f = InvoiceFields::placeholder("u1", Currency::Peso);
    f.items = r#"[{"detalle":"x","monto":100,"cantidad":2,"importe":200}]"#.to_string();
    let inv = SqliteStore::new(&conn).create(&f).unwrap();

    let shown = reload(&conn, &inv.id).items[0].id.clone();
    assert_eq!(reload(&conn, &inv.id).items[0].id, shown);

    run(&conn, &me, &["item", "set", &inv.id, &shown, "--qty", "3"]).unwrap();
    let saved = reload(&conn, &inv.id);
    assert_eq!(saved.items[0].id, shown);
    assert_eq!(saved.items[0].line_total, dec("300"));
    assert_eq!(saved.total, dec("300"));
}

#[test]
fn item_set_on_unknown_item_fails_without_saving() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let inv = new_invoice(&conn, "u1");
    assert!(run(&conn, &me, &["item", "set", &inv.id, "ghost", "--qty", "3"]).is_err());
    assert_eq!(reload(&conn, &inv.id), inv);
}

#[test]
fn header_fields_are_parsed() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let inv = new_invoice(&conn, "u1");
    run(
        &conn,
        &me,
        &[
            "invoice", "set", &inv.id, "--status", "pago", "--currency", "usd", "--tax-id",
            "131-12345-6", "--date", "2025-03-01", "--paid-on", "2025-03-15", "--term", "30 días",
        ],
    )
    .unwrap();
    let saved = reload(&conn, &inv.id);
    assert_eq!(saved.status, InvoiceStatus::Paid);
    assert_eq!(saved.currency, Currency::Dollar);
    assert_eq!(saved.tax_id, "131-12345-6");
    assert_eq!(saved.payment_term, "30 días");
    assert_eq!(saved.invoice_date.unwrap().to_string(), "2025-03-01");

    run(&conn, &me, &["invoice", "set", &inv.id, "--paid-on", ""]).unwrap();
    assert_eq!(reload(&conn, &inv.id).payment_date, None);

    assert!(run(&conn, &me, &["invoice", "set", &inv.id, "--status", "archived"]).is_err());
    assert!(run(&conn, &me, &["invoice", "set", &inv.id, "--discount", "ten"]).is_err());
}

#[test]
fn duplicate_copies_items_and_recomputes() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let inv = new_invoice(&conn, "u1");
    run(&conn, &me, &["item", "add", &inv.id, "--amount", "100", "--qty", "2"]).unwrap();
    run(&conn, &me, &["invoice", "set", &inv.id, "--discount", "20", "--receipt", "B01", "--date", "2025-01-01", "--tax"]).unwrap();

    let store = SqliteStore::new(&conn);
    let user = User { id: "u1".into() };
    let copy = invoices::duplicate(&store, &user, &inv.id).unwrap();
    let src = reload(&conn, &inv.id);
    assert_ne!(copy.id, src.id);
    assert_eq!(copy.items, src.items);
    assert_eq!(copy.receipt, "B01");
    assert_eq!(copy.discount, dec("20"));
    assert_eq!(copy.tax, src.tax);
    assert_eq!(copy.total, dec("212.4"));
    assert_eq!(copy.invoice_date, None);
}

#[test]
fn trash_restore_and_delete() {
    let conn = setup();
    let me = StaticSession::new("u1");
    let inv = new_invoice(&conn, "u1");

    run(&conn, &me, &["invoice", "trash", &inv.id]).unwrap();
    assert!(reload(&conn, &inv.id).trashed);
    run(&conn, &me, &["invoice", "restore", &inv.id]).unwrap();
    assert!(!reload(&conn, &inv.id).trashed);

    run(&conn, &me, &["invoice", "rm", &inv.id]).unwrap();
    assert!(SqliteStore::new(&conn).get(&inv.id).is_err());
}

#[test]
fn other_users_invoices_are_invisible() {
    let conn = setup();
    let inv = new_invoice(&conn, "u1");
    let intruder = StaticSession::new("u2");

    assert!(run(&conn, &intruder, &["invoice", "set", &inv.id, "--client", "X"]).is_err());
    assert!(run(&conn, &intruder, &["invoice", "trash", &inv.id]).is_err());
    assert!(run(&conn, &intruder, &["invoice", "rm", &inv.id]).is_err());
    assert!(run(&conn, &intruder, &["item", "add", &inv.id]).is_err());
    assert_eq!(reload(&conn, &inv.id), inv);
}

#[test]
fn commands_require_a_session() {
    let conn = setup();
    let nobody = StaticSession::anonymous();
    assert!(run(&conn, &nobody, &["invoice", "new"]).is_err());
}

fn list_page(conn: &Connection, user: &str, args: &[&str]) -> invoices::InvoicePage {
    let mut argv = vec!["billfold", "invoice", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("invoice", inv_m)) = matches.subcommand() else {
        panic!("no invoice subcommand");
    };
    let Some(("list", list_m)) = inv_m.subcommand() else {
        panic!("no list subcommand");
    };
    let store = SqliteStore::new(conn);
    invoices::query_rows(&store, &User { id: user.into() }, list_m).unwrap()
}

#[test]
fn list_filters_sorts_and_pages() {
    let conn = setup();
    let me = StaticSession::new("u1");
    for (client, receipt) in [("Acme", "B0101"), ("Beta", "B0102"), ("acme norte", "B0203")] {
        let inv = new_invoice(&conn, "u1");
        run(&conn, &me, &["invoice", "set", &inv.id, "--client", client, "--receipt", receipt]).unwrap();
    }
    let binned = new_invoice(&conn, "u1");
    run(&conn, &me, &["invoice", "trash", &binned.id]).unwrap();
    new_invoice(&conn, "u2");

    let all = list_page(&conn, "u1", &[]);
    assert_eq!(all.matched, 3);
    assert_eq!(all.pages, 1);

    let acme = list_page(&conn, "u1", &["--client", "ACME", "--sort", "client", "--order", "asc"]);
    let clients: Vec<_> = acme.rows.iter().map(|r| r.client.as_str()).collect();
    assert_eq!(clients, ["Acme", "acme norte"]);

    let b01 = list_page(&conn, "u1", &["--receipt", "b01"]);
    assert_eq!(b01.matched, 2);

    let paged = list_page(&conn, "u1", &["--per-page", "2", "--page", "2", "--sort", "receipt", "--order", "asc"]);
    assert_eq!(paged.pages, 2);
    assert_eq!(paged.rows.len(), 1);
    assert_eq!(paged.rows[0].receipt, "B0203");

    let trash = list_page(&conn, "u1", &["--trash"]);
    assert_eq!(trash.matched, 1);
    assert_eq!(trash.rows[0].id, binned.id);
}
