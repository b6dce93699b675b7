use std::io::Write;

use assert_cmd::Command;
use predicates as pred;
use predicates::prelude::PredicateBooleanExt;
use tempfile::NamedTempFile;

#[test]
fn end_to_end_settles_and_refunds() {
    // Script: user 1 is funded with 1000, opens a 400 deal that user 2
    // accepts and user 1 confirms, then opens and cancels a 100 deal.
    // The remaining rows must all be rejected without touching state.
    let mut file = NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        "op, actor, deal, amount, description, secret\n\
    credit, 1, , 1000.0, , sesame\n\
    open, 1, widget, 400.0, widget,\n\
    accept, 2, widget, , ,\n\
    complete, 1, widget, , ,\n\
    open, 1, gadget, 100.0, gadget,\n\
    cancel, 1, gadget, , ,\n\
    accept, 3, widget, , ,\n\
    open, 1, yacht, 9000.0, yacht,\n\
    credit, 2, , 50.0, , wrong\n\
    bogus, 1, , ,"
    )
    .unwrap();

    let exe = env!("CARGO_BIN_EXE_escrow_engine");
    let mut cmd = Command::new(exe);
    cmd.arg(file.path()).env("ESCROW_ADMIN_SECRET", "sesame");

    cmd.assert()
        .success()
        .stdout(pred::str::contains("user,balance"))
        .stdout(pred::str::contains("1,600.0000"))
        .stdout(pred::str::contains("2,400.0000"))
        .stdout(pred::str::contains(",1,2,400.0000,completed,widget"))
        .stdout(pred::str::contains(",1,,100.0000,cancelled,gadget"))
        .stderr(pred::str::contains("rejected:"));
}

#[test]
fn credit_is_rejected_without_configured_secret() {
    let mut file = NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        "op, actor, deal, amount, description, secret\n\
    credit, 1, , 1000.0, , sesame"
    )
    .unwrap();

    let exe = env!("CARGO_BIN_EXE_escrow_engine");
    let mut cmd = Command::new(exe);
    cmd.arg(file.path()).env_remove("ESCROW_ADMIN_SECRET");

    cmd.assert()
        .success()
        .stdout(pred::str::contains("user,balance"))
        .stdout(pred::str::contains("1,").not())
        .stderr(pred::str::contains("rejected: operation forbidden for user 1"));
}
